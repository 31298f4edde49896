//! Client configuration.
//!
//! All fields have sensible defaults, so an empty YAML/JSON document yields a
//! working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::discovery::SsdpConfig;
use crate::device::dispatch::{DirectAllowList, DirectOperation};
use crate::protocol_constants::{DEFAULT_DISCOVERY_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS};

/// Tunables for transport, discovery and command dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request HTTP timeout (milliseconds).
    pub request_timeout_ms: u64,

    /// Discovery listening window (milliseconds).
    pub discovery_timeout_ms: u64,

    /// Number of M-SEARCH packets sent per interface.
    pub discovery_send_count: u64,

    /// Delay between M-SEARCH repeats (milliseconds).
    pub discovery_retry_delay_ms: u64,

    /// Direct operations callable with `name(args)` syntax.
    pub direct_commands: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
            discovery_send_count: 2,
            discovery_retry_delay_ms: 500,
            direct_commands: DirectOperation::ALL
                .iter()
                .map(|op| op.name().to_string())
                .collect(),
        }
    }
}

impl ClientConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be >= 1".to_string());
        }
        if self.discovery_timeout_ms == 0 {
            return Err("discovery_timeout_ms must be >= 1".to_string());
        }
        if self.discovery_send_count == 0 {
            return Err("discovery_send_count must be >= 1".to_string());
        }
        self.allow_list().map(|_| ())
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Discovery listening window.
    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Builds the SSDP settings for a discovery run.
    #[must_use]
    pub fn ssdp_config(&self) -> SsdpConfig {
        SsdpConfig {
            send_count: self.discovery_send_count,
            retry_delay: Duration::from_millis(self.discovery_retry_delay_ms),
            discovery_timeout: self.discovery_timeout(),
            ..SsdpConfig::default()
        }
    }

    /// Resolves `direct_commands` into an allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown operation.
    pub fn allow_list(&self) -> Result<DirectAllowList, String> {
        self.direct_commands
            .iter()
            .map(|name| {
                DirectOperation::from_name(name)
                    .ok_or_else(|| format!("unknown direct command in allow-list: {}", name))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(DirectAllowList::new)
    }
}
