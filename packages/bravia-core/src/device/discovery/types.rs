//! Shared types for television discovery.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to create or bind a UDP socket.
    #[error("failed to bind UDP socket: {0}")]
    SocketBind(#[source] std::io::Error),

    /// Every M-SEARCH send failed.
    #[error("failed to send SSDP search: {0}")]
    SendSearch(#[source] std::io::Error),

    /// No usable network interfaces found.
    #[error("no usable network interfaces found")]
    NoInterfaces,

    /// The listening window closed without a single response.
    #[error("no BRAVIA devices found")]
    NoneFound,
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// A television that answered the SSDP search.
///
/// Every field is optional; devices omit headers more often than one would
/// hope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DiscoveredDevice {
    /// IPv4 address taken from the `LOCATION` URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Device UUID taken from `USN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Model name taken from `X-AV-Server-Info`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Insertion-ordered set of discovered devices.
///
/// Devices are keyed by UUID; a device without one is only dropped when an
/// identical device was already seen.
#[derive(Debug, Default)]
pub struct DeviceSet {
    devices: Vec<DiscoveredDevice>,
    seen_uuids: HashSet<String>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `device` unless it duplicates one already present.
    ///
    /// Returns true if the device was new.
    pub fn insert(&mut self, device: DiscoveredDevice) -> bool {
        let is_new = match &device.uuid {
            Some(uuid) => self.seen_uuids.insert(uuid.clone()),
            None => !self.devices.contains(&device),
        };
        if is_new {
            self.devices.push(device);
        }
        is_new
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices in first-seen order.
    pub fn into_vec(self) -> Vec<DiscoveredDevice> {
        self.devices
    }
}

/// Virtual interface prefixes to filter out during discovery.
pub const VIRTUAL_INTERFACE_PREFIXES: &[&str] = &[
    "lo", "docker", "veth", "br-", "virbr", "vmnet", "vbox", "tun", "tap",
];

/// Checks if an interface name belongs to a virtual/container interface.
pub fn is_virtual_interface(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    VIRTUAL_INTERFACE_PREFIXES
        .iter()
        .any(|prefix| name_lower.starts_with(prefix))
}
