//! Bravia Core - device session and command orchestration for Sony BRAVIA TVs.
//!
//! This crate talks to a television over the vendor's local HTTP control
//! protocol. It is used by the `bravia` command-line front end, but has no
//! dependency on it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`device`]: Transport, discovery, capability session and command dispatch
//! - [`config`]: Tunable client configuration
//! - [`protocol_constants`]: Fixed wire-level constants
//! - [`error`]: Centralized error types
//!
//! # Typical Flow
//!
//! ```ignore
//! let devices = bravia_core::discover(Duration::from_secs(3)).await?;
//! let mut session = Session::new("192.168.1.114", Some("0000".into()))?;
//! session.connect().await?;
//! let outcomes = session.execute(vec!["PowerOn".into(), "setInputSource(HDMI 1)".into()]).await;
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod device;
pub mod error;
pub mod protocol_constants;

// Re-export commonly used types at the crate root
pub use config::ClientConfig;
pub use error::{BraviaError, BraviaResult, ErrorCode};

// Re-export device types
pub use device::address::{AddressError, DeviceAddress};
pub use device::discovery::{
    discover, discover_with_config, DiscoveredDevice, DiscoveryError, DiscoveryResult, SsdpConfig,
};
pub use device::dispatch::{
    CommandDescriptor, CommandOutcome, DirectAllowList, DirectOperation, DirectOutput, Dispatcher,
};
pub use device::session::{ConnectError, Session, SessionError, SessionResult, SessionState};
pub use device::traits::DeviceTransport;
pub use device::transport::{HttpTransport, TransportError, TransportResult};
pub use device::types::{
    CapabilityTables, InputSource, PowerStatus, RemoteCommand, RemoteControllerInfo, SystemInfo,
};
