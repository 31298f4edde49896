//! Centralized error types for the Bravia core library.
//!
//! Each module owns a `thiserror` enum; this module gives all of them stable
//! machine-readable codes and folds them into [`BraviaError`] for callers
//! that mix operations.

use serde::Serialize;
use thiserror::Error;

use crate::device::address::AddressError;
use crate::device::discovery::DiscoveryError;
use crate::device::session::{ConnectError, SessionError};
use crate::device::transport::TransportError;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a stable machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for AddressError {
    fn code(&self) -> &'static str {
        "invalid_address"
    }
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Rpc { .. } => "device_error",
            Self::Protocol(_) => "protocol_error",
            Self::Client(_) => "client_build_failed",
        }
    }
}

impl ErrorCode for SessionError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::InvalidResult(_) => "invalid_result",
            Self::InvalidInputSource(_) => "invalid_input_source",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Configuration(_) => "configuration_error",
        }
    }
}

impl ErrorCode for ConnectError {
    fn code(&self) -> &'static str {
        match self {
            Self::SessionFailed => "session_failed",
            Self::Fetch { source, .. } => source.code(),
        }
    }
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::SocketBind(_) => "socket_bind_failed",
            Self::SendSearch(_) => "ssdp_send_failed",
            Self::NoInterfaces => "no_network_interfaces",
            Self::NoneFound => "none_found",
        }
    }
}

/// Crate-wide error type.
///
/// Variants carry the rendered message of the error they were converted
/// from, so the umbrella stays serializable.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum BraviaError {
    /// Malformed device address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Device unreachable or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// Device answered with an error or an unexpected shape.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No cached input has the requested label.
    #[error("{0}")]
    InvalidInputSource(String),

    /// No catalog button has the requested name.
    #[error("{0}")]
    UnknownCommand(String),

    /// The session failed to connect earlier and cannot be reused.
    #[error("{0}")]
    SessionFailed(String),

    /// Discovery finished without finding a device.
    #[error("{0}")]
    NoneFound(String),

    /// Discovery could not run (sockets, interfaces).
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Rejected configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BraviaError {
    /// Returns a machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "invalid_address",
            Self::Network(_) => "network_error",
            Self::Protocol(_) => "protocol_error",
            Self::InvalidInputSource(_) => "invalid_input_source",
            Self::UnknownCommand(_) => "unknown_command",
            Self::SessionFailed(_) => "session_failed",
            Self::NoneFound(_) => "none_found",
            Self::Discovery(_) => "discovery_failed",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Picks the variant for a session error, keeping `message` as text.
    fn from_session(err: &SessionError, message: String) -> Self {
        match err {
            SessionError::InvalidAddress(_) => Self::InvalidAddress(message),
            SessionError::Transport(e) if e.is_network() => Self::Network(message),
            SessionError::Transport(TransportError::Client(_)) => Self::Configuration(message),
            SessionError::Transport(_) | SessionError::InvalidResult(_) => Self::Protocol(message),
            SessionError::InvalidInputSource(_) => Self::InvalidInputSource(message),
            SessionError::UnknownCommand(_) => Self::UnknownCommand(message),
            SessionError::Configuration(_) => Self::Configuration(message),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::device::discovery::DiscoveryResult;
pub use crate::device::session::SessionResult;
pub use crate::device::transport::TransportResult;

/// Convenient Result alias for crate-wide operations.
pub type BraviaResult<T> = Result<T, BraviaError>;

impl From<AddressError> for BraviaError {
    fn from(err: AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<TransportError> for BraviaError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        match err {
            TransportError::Network(_) => Self::Network(message),
            TransportError::Client(_) => Self::Configuration(message),
            _ => Self::Protocol(message),
        }
    }
}

impl From<SessionError> for BraviaError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        Self::from_session(&err, message)
    }
}

impl From<ConnectError> for BraviaError {
    fn from(err: ConnectError) -> Self {
        let message = err.to_string();
        match &err {
            ConnectError::SessionFailed => Self::SessionFailed(message),
            ConnectError::Fetch { source, .. } => Self::from_session(source, message),
        }
    }
}

impl From<DiscoveryError> for BraviaError {
    fn from(err: DiscoveryError) -> Self {
        let message = err.to_string();
        match err {
            DiscoveryError::NoneFound => Self::NoneFound(message),
            _ => Self::Discovery(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::address::DeviceAddress;

    #[test]
    fn address_error_maps_to_invalid_address() {
        let err = DeviceAddress::parse("1.2.3").unwrap_err();
        assert_eq!(err.code(), "invalid_address");
        assert_eq!(BraviaError::from(err).code(), "invalid_address");
    }

    #[test]
    fn transport_errors_split_into_network_and_protocol() {
        let err = TransportError::Protocol("bad envelope".into());
        assert_eq!(err.code(), "protocol_error");
        assert_eq!(BraviaError::from(err).code(), "protocol_error");

        let err = TransportError::Rpc {
            code: 12,
            message: "getFoo".into(),
        };
        assert_eq!(err.code(), "device_error");
        assert_eq!(BraviaError::from(err).code(), "protocol_error");
    }

    #[test]
    fn client_build_error_is_local_configuration() {
        let source = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .unwrap_err();
        let err = TransportError::Client(source);

        assert!(!err.is_network());
        assert!(!err.is_protocol());
        assert_eq!(err.code(), "client_build_failed");
        assert!(err.to_string().starts_with("failed to build HTTP client"));

        let umbrella = BraviaError::from(SessionError::Transport(err));
        assert_eq!(umbrella.code(), "configuration_error");
    }

    #[test]
    fn session_errors_keep_specific_codes() {
        let err = SessionError::InvalidInputSource("HDMI 9".into());
        assert_eq!(err.code(), "invalid_input_source");
        assert_eq!(BraviaError::from(err).code(), "invalid_input_source");

        let err = SessionError::UnknownCommand("Jump".into());
        assert_eq!(err.code(), "unknown_command");
        let umbrella = BraviaError::from(err);
        assert_eq!(umbrella.code(), "unknown_command");
        assert_eq!(
            umbrella.to_string(),
            "Command: 'Jump' is not available for your device."
        );
    }

    #[test]
    fn connect_error_uses_source_category() {
        let err = ConnectError::Fetch {
            address: DeviceAddress::parse("192.168.1.114").unwrap(),
            source: SessionError::InvalidResult("Invalid input source result"),
        };
        assert_eq!(err.code(), "invalid_result");

        let umbrella = BraviaError::from(err);
        assert_eq!(umbrella.code(), "protocol_error");
        assert!(umbrella.to_string().contains("Invalid input source result"));
        assert!(umbrella.to_string().contains("192.168.1.114"));

        assert_eq!(
            BraviaError::from(ConnectError::SessionFailed).code(),
            "session_failed"
        );
    }

    #[test]
    fn discovery_none_found_has_own_code() {
        assert_eq!(DiscoveryError::NoneFound.code(), "none_found");
        assert_eq!(BraviaError::from(DiscoveryError::NoneFound).code(), "none_found");
        assert_eq!(
            BraviaError::from(DiscoveryError::NoInterfaces).code(),
            "discovery_failed"
        );
    }

    #[test]
    fn umbrella_serializes_with_type_tag() {
        let err = BraviaError::Network("timed out".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "Network", "details": "timed out" })
        );
    }
}
