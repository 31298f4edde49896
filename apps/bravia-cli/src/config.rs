//! CLI configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use bravia_core::ClientConfig;
use serde::Deserialize;

/// CLI configuration loaded from YAML with environment overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Television IPv4 address.
    /// Override: `BRAVIA_HOST`
    pub host: Option<String>,

    /// Pre-shared key configured on the television.
    /// Override: `BRAVIA_PSK`
    pub psk: Option<String>,

    /// Library tunables (timeouts, discovery, allow-list).
    /// `request_timeout_ms` override: `BRAVIA_REQUEST_TIMEOUT_MS`
    pub client: ClientConfig,
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("BRAVIA_HOST").filter(|v| !v.is_empty()) {
            self.host = Some(host);
        }

        if let Some(psk) = lookup("BRAVIA_PSK").filter(|v| !v.is_empty()) {
            self.psk = Some(psk);
        }

        if let Some(val) = lookup("BRAVIA_REQUEST_TIMEOUT_MS") {
            match val.parse() {
                Ok(ms) => self.client.request_timeout_ms = ms,
                Err(_) => log::warn!("Ignoring invalid BRAVIA_REQUEST_TIMEOUT_MS: {:?}", val),
            }
        }
    }
}
