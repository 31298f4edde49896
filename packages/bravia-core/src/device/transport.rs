//! Low-level HTTP transport for BRAVIA control endpoints.
//!
//! This module handles the JSON-RPC and IRCC envelope building, the HTTP
//! exchange and response classification. For the session-level operations
//! built on top of it, see `session.rs`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::address::DeviceAddress;
use super::services::BraviaService;
use super::traits::DeviceTransport;
use super::utils::{escape_xml, extract_fault_message};
use crate::config::ClientConfig;
use crate::protocol_constants::{IRCC_ACTION, IRCC_SERVICE_URN, PSK_HEADER, RPC_VERSION};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while talking to a television.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure, timeout, or unreadable response stream.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Device returned a non-success HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Device returned a JSON-RPC `error` envelope.
    #[error("device error {code}: {message}")]
    Rpc {
        /// Vendor error code (e.g. 12 = no such method, 403 = forbidden).
        code: i64,
        /// Vendor error message.
        message: String,
    },

    /// Response parsed but did not have the expected envelope shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The local HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

impl TransportError {
    /// Returns true for timeouts and connection failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns true if the device answered, but not in the expected way.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus(_, _) | Self::Rpc { .. } | Self::Protocol(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-RPC envelope sent to the Scalar Web API endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    /// API method name (e.g. `getPowerStatus`).
    pub method: String,
    /// Request id taken from the owning session's counter.
    pub id: u64,
    /// Positional parameters.
    pub params: Vec<Value>,
    /// API version, always `"1.0"`.
    pub version: &'static str,
}

impl RpcRequest {
    /// Creates an envelope for `method` with the given id and parameters.
    #[must_use]
    pub fn new(method: impl Into<String>, id: u64, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            id,
            params,
            version: RPC_VERSION,
        }
    }
}

/// Payload of a device request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON-RPC call.
    Rpc(RpcRequest),
    /// Pre-built IRCC SOAP envelope.
    Ircc(String),
}

/// A single POST to one of the device endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    /// Target device.
    pub address: DeviceAddress,
    /// Pre-shared key; the header is omitted when `None`.
    pub auth_key: Option<String>,
    /// Endpoint.
    pub service: BraviaService,
    /// Payload.
    pub body: RequestBody,
}

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON object returned by the device.
    Json(Value),
    /// Empty or non-JSON body, treated as success.
    Empty,
}

impl ResponseBody {
    /// Returns the `result` array of a JSON-RPC response, if present.
    #[must_use]
    pub fn result(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Json(value) => value.get("result").and_then(Value::as_array),
            Self::Empty => None,
        }
    }

    /// Consumes the body and returns its `result` array, if present.
    #[must_use]
    pub fn into_result(self) -> Option<Vec<Value>> {
        match self {
            Self::Json(Value::Object(mut map)) => match map.remove("result") {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope Building
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the SOAP envelope carrying one IRCC button code.
///
/// Kept on a single line: the device's SOAP parser rejects whitespace before
/// the root element.
#[must_use]
pub fn build_ircc_envelope(code: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{urn}"><IRCCCode>{code}</IRCCCode></u:{action}></s:Body></s:Envelope>"#,
        action = IRCC_ACTION,
        urn = IRCC_SERVICE_URN,
        code = escape_xml(code),
    )
}

/// Classifies a response body.
///
/// Bodies that are not JSON resolve to [`ResponseBody::Empty`]; several
/// endpoints (IRCC, `setPlayContent`) legitimately reply with nothing useful.
pub fn parse_response_body(text: &str) -> TransportResult<ResponseBody> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("[Transport] Non-JSON response body treated as empty: {}", e);
            return Ok(ResponseBody::Empty);
        }
    };

    if !value.is_object() {
        return Err(TransportError::Protocol(format!(
            "expected JSON object envelope, got: {}",
            value
        )));
    }

    if let Some(error) = value.get("error") {
        return Err(rpc_error(error));
    }

    Ok(ResponseBody::Json(value))
}

/// Classifies a complete HTTP exchange.
///
/// A JSON-RPC `error` envelope wins over the status line. Any other body on a
/// non-success status becomes [`TransportError::HttpStatus`], with the UPnP
/// fault text when the body carries one.
pub fn classify_response(status: u16, text: String) -> TransportResult<ResponseBody> {
    if (200..300).contains(&status) {
        return parse_response_body(&text);
    }

    if let Err(err @ TransportError::Rpc { .. }) = parse_response_body(&text) {
        return Err(err);
    }

    let message = extract_fault_message(&text).unwrap_or(text);
    Err(TransportError::HttpStatus(status, message))
}

/// Converts a `[code, message]` error envelope into a transport error.
fn rpc_error(error: &Value) -> TransportError {
    let code = error.get(0).and_then(Value::as_i64);
    let message = error.get(1).and_then(Value::as_str);

    match (code, message) {
        (Some(code), message) => TransportError::Rpc {
            code,
            message: message.unwrap_or_default().to_string(),
        },
        _ => TransportError::Protocol(format!("malformed error envelope: {}", error)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Transport
// ─────────────────────────────────────────────────────────────────────────────

/// reqwest-backed [`DeviceTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
    port: u16,
}

impl HttpTransport {
    /// Default HTTP port of the control server.
    pub const DEFAULT_PORT: u16 = 80;

    /// Creates a transport using the configured request timeout.
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self::with_client(client, timeout))
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            port: Self::DEFAULT_PORT,
        }
    }

    /// Overrides the device port (for devices behind port forwarding, and tests).
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn post(&self, request: DeviceRequest) -> TransportResult<ResponseBody> {
        if request.service.is_json_rpc() != matches!(request.body, RequestBody::Rpc(_)) {
            return Err(TransportError::Protocol(format!(
                "payload does not match the {} endpoint",
                request.service
            )));
        }

        let url = request
            .address
            .endpoint_url(self.port, request.service.path());

        let mut builder = self.client.post(&url).timeout(self.timeout);
        if let Some(key) = request.auth_key.as_deref() {
            builder = builder.header(PSK_HEADER, key);
        }

        let label = match &request.body {
            RequestBody::Rpc(rpc) => {
                log::debug!(
                    "[Transport] Request body: {}",
                    serde_json::to_string(rpc).unwrap_or_default()
                );
                builder = builder.json(rpc);
                rpc.method.clone()
            }
            RequestBody::Ircc(envelope) => {
                log::debug!("[Transport] Request body: {}", envelope);
                builder = builder
                    .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
                    .header("SOAPACTION", format!("\"{}#{}\"", IRCC_SERVICE_URN, IRCC_ACTION))
                    .body(envelope.clone());
                IRCC_ACTION.to_string()
            }
        };

        log::info!("[Transport] {} -> {}", label, url);

        let start = std::time::Instant::now();
        let res = builder.send().await;
        log::info!(
            "[Transport] {} completed in {:?}: {:?}",
            label,
            start.elapsed(),
            res.as_ref().map(|r| r.status())
        );

        let res = res?;
        let status = res.status();
        let text = res.text().await?;

        classify_response(status.as_u16(), text)
    }
}
