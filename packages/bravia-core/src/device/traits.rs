//! Trait abstractions for device I/O.
//!
//! The session depends on this trait rather than on reqwest directly, so
//! session and dispatcher logic can be tested against a recording fake.

use async_trait::async_trait;

use crate::device::transport::{DeviceRequest, ResponseBody, TransportResult};

/// Sends one request to a television endpoint.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// POSTs the request and classifies the response.
    ///
    /// Implementations must treat an unparseable body as
    /// [`ResponseBody::Empty`] success and surface timeouts as
    /// `TransportError::Network`.
    async fn post(&self, request: DeviceRequest) -> TransportResult<ResponseBody>;
}
