//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the device firmware and the SSDP/SOAP
//! specifications; changing them would break interoperability.

// ─────────────────────────────────────────────────────────────────────────────
// Scalar Web API (JSON-RPC)
// ─────────────────────────────────────────────────────────────────────────────

/// Version string sent in every JSON-RPC envelope.
pub const RPC_VERSION: &str = "1.0";

/// Header carrying the pre-shared key.
pub const PSK_HEADER: &str = "X-Auth-PSK";

/// Power status value reported by a switched-on device.
pub const POWER_STATUS_ACTIVE: &str = "active";

// ─────────────────────────────────────────────────────────────────────────────
// IRCC (remote button codes over SOAP)
// ─────────────────────────────────────────────────────────────────────────────

/// UPnP service URN of the IRCC endpoint.
pub const IRCC_SERVICE_URN: &str = "urn:schemas-sony-com:service:IRCC:1";

/// SOAP action used to send a button code.
pub const IRCC_ACTION: &str = "X_SendIRCC";

// ─────────────────────────────────────────────────────────────────────────────
// SSDP
// ─────────────────────────────────────────────────────────────────────────────

/// Search target advertised by devices exposing the Scalar Web API.
pub const SCALAR_WEB_API_SEARCH_TARGET: &str = "urn:schemas-sony-com:service:ScalarWebAPI:1";

/// Vendor header carrying `mn="<model>"` in SSDP responses.
pub const AV_SERVER_INFO_HEADER: &str = "X-AV-Server-Info";

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Default timeout for device HTTP requests (milliseconds).
///
/// Devices live on the same subnet, so anything slower means the TV is off
/// or unreachable.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Default discovery listening window (milliseconds).
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 3000;
