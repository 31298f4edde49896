//! BRAVIA device control and discovery.
//!
//! This module provides everything needed to find a television on the local
//! network and drive it through the Scalar Web API and the IRCC endpoint.
//!
//! # Module Structure
//!
//! - `address` - Validated IPv4 device address
//! - `services` - Endpoint definitions (paths, names)
//! - `traits` - Transport abstraction for testability
//! - `transport` - HTTP transport, JSON-RPC and IRCC envelopes
//! - `types` - Capability table types
//! - `session` - Capability session (connect, power, inputs, buttons)
//! - `dispatch` - Command resolution and ordered batch execution
//! - `discovery` - SSDP multicast discovery
//! - `utils` - Shared parsing helpers

pub mod address;
pub mod discovery;
pub mod dispatch;
pub mod services;
pub mod session;
pub mod traits;
pub mod transport;
pub mod types;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use address::DeviceAddress;
pub use services::BraviaService;
pub use session::Session;
pub use traits::DeviceTransport;
