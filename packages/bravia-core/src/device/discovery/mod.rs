//! Television discovery over SSDP.
//!
//! A single multicast search for the Scalar Web API service, repeated a few
//! times inside one listening window. Results are deduplicated by UUID.

pub mod ssdp;
pub mod types;

use std::time::Duration;

pub use ssdp::{discover_multicast, SsdpConfig};
pub use types::{DiscoveredDevice, DiscoveryError, DiscoveryResult};

/// Discovers televisions, listening for `timeout` with default send settings.
///
/// # Errors
///
/// Returns [`DiscoveryError::NoneFound`] if no device answered.
pub async fn discover(timeout: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>> {
    let config = SsdpConfig {
        discovery_timeout: timeout,
        ..SsdpConfig::default()
    };
    discover_with_config(&config).await
}

/// Discovers televisions with explicit SSDP settings.
pub async fn discover_with_config(config: &SsdpConfig) -> DiscoveryResult<Vec<DiscoveredDevice>> {
    log::info!(
        "[SSDP] Searching for devices ({}ms window)",
        config.discovery_timeout.as_millis()
    );
    discover_multicast(config).await
}
