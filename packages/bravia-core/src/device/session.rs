//! Capability session for one television.
//!
//! A [`Session`] owns everything known about a device: its address, the
//! pre-shared key, the request-id counter and the capability tables fetched
//! by [`Session::connect`]. It has no internal locking; every mutating
//! operation takes `&mut self`, so one session runs one operation chain at a
//! time. Wrap it in a mutex or an actor if several tasks need it.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use super::address::{AddressError, DeviceAddress};
use super::dispatch::{CommandOutcome, DirectAllowList, Dispatcher};
use super::services::BraviaService;
use super::traits::DeviceTransport;
use super::transport::{
    build_ircc_envelope, DeviceRequest, HttpTransport, RequestBody, ResponseBody, RpcRequest,
    TransportError,
};
use super::types::{
    CapabilityTables, InputSource, PowerStatus, RemoteCommand, RemoteControllerInfo, SystemInfo,
};
use crate::config::ClientConfig;

const INVALID_SYSTEM_INFO: &str = "Invalid system information result";
const INVALID_INPUT_SOURCE: &str = "Invalid input source result";
const INVALID_REMOTE_CONTROLLER_INFO: &str = "Invalid remote controller info result";
const INVALID_POWER_STATUS: &str = "Invalid power status result";

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from session construction and session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Address failed dotted-quad validation.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// The HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response parsed but did not have the expected `result` shape.
    #[error("{0}")]
    InvalidResult(&'static str),

    /// No cached input carries the requested label.
    #[error("Invalid input source label: {0:?}")]
    InvalidInputSource(String),

    /// The remote-controller catalog has no button with this name.
    #[error("Command: '{0}' is not available for your device.")]
    UnknownCommand(String),

    /// Client configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Convenient Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from [`Session::connect`].
#[derive(Debug, Error)]
pub enum ConnectError {
    /// A previous connect failed; the session is no longer usable.
    #[error("session previously failed to connect; create a new session to retry")]
    SessionFailed,

    /// One of the capability fetches failed.
    #[error(
        "Failed to connect device {address}: {source}. \
         Please ensure your device is switched on and try again."
    )]
    Fetch {
        /// Device that was being connected.
        address: DeviceAddress,
        /// First failing fetch.
        #[source]
        source: SessionError,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, never connected.
    Uninitialized,
    /// A connect is in flight (only observable if that future was dropped).
    Connecting,
    /// Capability tables are populated.
    Ready,
    /// Connect failed; terminal.
    Failed,
}

/// Per-device state and the operations built on it.
pub struct Session {
    address: DeviceAddress,
    auth_key: Option<String>,
    request_id: u64,
    transport: Arc<dyn DeviceTransport>,
    capabilities: CapabilityTables,
    power_status: Option<PowerStatus>,
    state: SessionState,
    allow_list: DirectAllowList,
}

impl Session {
    /// Creates a session with the default configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::InvalidAddress`] if `address` is not a strict
    /// IPv4 dotted quad.
    pub fn new(address: &str, auth_key: Option<String>) -> SessionResult<Self> {
        Self::with_config(address, auth_key, &ClientConfig::default())
    }

    /// Creates a session using `config` for timeouts and the direct-command
    /// allow-list.
    pub fn with_config(
        address: &str,
        auth_key: Option<String>,
        config: &ClientConfig,
    ) -> SessionResult<Self> {
        let address = DeviceAddress::parse(address)?;
        config.validate().map_err(SessionError::Configuration)?;
        let allow_list = config.allow_list().map_err(SessionError::Configuration)?;
        let transport = HttpTransport::new(config)?;

        let mut session = Self::with_transport(address, auth_key, Arc::new(transport));
        session.allow_list = allow_list;
        Ok(session)
    }

    /// Creates a session over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        address: DeviceAddress,
        auth_key: Option<String>,
        transport: Arc<dyn DeviceTransport>,
    ) -> Self {
        Self {
            address,
            auth_key: auth_key.filter(|k| !k.is_empty()),
            request_id: 0,
            transport,
            capabilities: CapabilityTables::default(),
            power_status: None,
            state: SessionState::Uninitialized,
            allow_list: DirectAllowList::default(),
        }
    }

    /// Replaces the direct-command allow-list used by [`Session::execute`].
    pub fn set_allow_list(&mut self, allow_list: DirectAllowList) {
        self.allow_list = allow_list;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Device address.
    #[must_use]
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Cached capability tables.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilityTables {
        &self.capabilities
    }

    /// Id of the most recent request (0 before the first request).
    #[must_use]
    pub fn last_request_id(&self) -> u64 {
        self.request_id
    }

    /// Power status from the last successful [`Session::get_power_status`].
    #[must_use]
    pub fn last_power_status(&self) -> Option<&PowerStatus> {
        self.power_status.as_ref()
    }

    /// The allow-list applied by [`Session::execute`].
    #[must_use]
    pub fn allow_list(&self) -> &DirectAllowList {
        &self.allow_list
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocates the next request id. Ids are never reused or rolled back.
    fn next_request_id(&mut self) -> u64 {
        self.request_id += 1;
        self.request_id
    }

    fn request(&self, service: BraviaService, body: RequestBody) -> DeviceRequest {
        DeviceRequest {
            address: self.address,
            auth_key: self.auth_key.clone(),
            service,
            body,
        }
    }

    fn rpc_request(
        &mut self,
        service: BraviaService,
        method: &str,
        params: Vec<Value>,
    ) -> DeviceRequest {
        let id = self.next_request_id();
        self.request(service, RequestBody::Rpc(RpcRequest::new(method, id, params)))
    }

    async fn call(
        &mut self,
        service: BraviaService,
        method: &str,
        params: Vec<Value>,
    ) -> Result<ResponseBody, TransportError> {
        let request = self.rpc_request(service, method, params);
        self.transport.post(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetches inputs, system info and the remote-controller catalog
    /// concurrently and caches them.
    ///
    /// All three fetches are awaited even if one fails. Tables of the fetches
    /// that succeeded are kept (no rollback) but the session becomes
    /// [`SessionState::Failed`] and must not be used further.
    pub async fn connect(&mut self) -> Result<&CapabilityTables, ConnectError> {
        if self.state == SessionState::Failed {
            return Err(ConnectError::SessionFailed);
        }

        self.state = SessionState::Connecting;
        log::info!("[Session] Connecting to {}", self.address);

        // Ids are allocated before the fetches run concurrently
        let inputs_req = self.rpc_request(
            BraviaService::AvContent,
            "getCurrentExternalInputsStatus",
            vec![],
        );
        let system_req = self.rpc_request(BraviaService::System, "getSystemInformation", vec![]);
        let remote_req = self.rpc_request(BraviaService::System, "getRemoteControllerInfo", vec![]);

        let transport = Arc::clone(&self.transport);
        let (inputs, system, remote) = tokio::join!(
            fetch(transport.as_ref(), inputs_req, parse_input_sources),
            fetch(transport.as_ref(), system_req, parse_system_info),
            fetch(transport.as_ref(), remote_req, parse_remote_controller_info),
        );

        let mut first_error = None;

        match inputs {
            Ok(inputs) => self.capabilities.input_sources = inputs,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
        match system {
            Ok(info) => self.capabilities.system_info = info,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
        match remote {
            Ok(info) => self.capabilities.remote_controller = info,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        if let Some(source) = first_error {
            log::warn!("[Session] Connect to {} failed: {}", self.address, source);
            self.state = SessionState::Failed;
            return Err(ConnectError::Fetch {
                address: self.address,
                source,
            });
        }

        log::info!(
            "[Session] Connected to {}: {} input(s), {} remote command(s)",
            self.address,
            self.capabilities.input_sources.len(),
            self.capabilities.remote_controller.commands.len()
        );
        self.state = SessionState::Ready;
        Ok(&self.capabilities)
    }

    /// Queries the power status and caches it.
    pub async fn get_power_status(&mut self) -> SessionResult<PowerStatus> {
        let body = self
            .call(BraviaService::System, "getPowerStatus", vec![])
            .await?;
        let status = parse_power_status(body)?;

        log::info!("[Session] {} power status: {}", self.address, status.status);
        self.power_status = Some(status.clone());
        Ok(status)
    }

    /// Switches to the cached input whose label equals `label` exactly.
    ///
    /// Does not refetch the input table.
    pub async fn set_input_source(&mut self, label: &str) -> SessionResult<()> {
        let uri = self
            .capabilities
            .find_input(label)
            .map(|input| input.uri.clone())
            .ok_or_else(|| SessionError::InvalidInputSource(label.to_string()))?;

        log::info!("[Session] Switching {} to {} ({})", self.address, label, uri);
        self.call(
            BraviaService::AvContent,
            "setPlayContent",
            vec![json!({ "uri": uri })],
        )
        .await?;
        Ok(())
    }

    /// Presses the catalog button named `name`.
    ///
    /// Transport failures are logged and swallowed.
    pub async fn send_remote_command(&mut self, name: &str) -> SessionResult<()> {
        let command = self
            .capabilities
            .find_command(name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownCommand(name.to_string()))?;

        self.send_ircc(&command).await;
        Ok(())
    }

    /// Sends one IRCC code, swallowing transport errors.
    pub(crate) async fn send_ircc(&mut self, command: &RemoteCommand) {
        // The IRCC envelope carries no id, but the counter still advances once
        // per outbound request.
        self.next_request_id();
        let request = self.request(
            BraviaService::Ircc,
            RequestBody::Ircc(build_ircc_envelope(&command.value)),
        );

        log::info!("[Session] Sending {} to {}", command.name, self.address);
        if let Err(e) = self.transport.post(request).await {
            log::warn!(
                "[Session] Ignoring IRCC failure for {} on {}: {}",
                command.name,
                self.address,
                e
            );
        }
    }

    /// Resolves and runs a batch of raw command strings in order.
    ///
    /// Never fails as a whole; see [`Dispatcher::execute`].
    pub async fn execute(&mut self, commands: Vec<String>) -> Vec<CommandOutcome> {
        let dispatcher = Dispatcher::new(self.allow_list.clone());
        dispatcher.execute(self, commands).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("auth_key", &self.auth_key.as_ref().map(|_| "<redacted>"))
            .field("request_id", &self.request_id)
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Parsing
// ─────────────────────────────────────────────────────────────────────────────

async fn fetch<T>(
    transport: &dyn DeviceTransport,
    request: DeviceRequest,
    parse: fn(ResponseBody) -> SessionResult<T>,
) -> SessionResult<T> {
    let body = transport.post(request).await?;
    parse(body)
}

/// Returns the `result` array if it has exactly `len` elements.
fn expect_result(
    body: ResponseBody,
    len: usize,
    message: &'static str,
) -> SessionResult<Vec<Value>> {
    match body.into_result() {
        Some(items) if items.len() == len => Ok(items),
        _ => Err(SessionError::InvalidResult(message)),
    }
}

fn parse_input_sources(body: ResponseBody) -> SessionResult<Vec<InputSource>> {
    let mut result = expect_result(body, 1, INVALID_INPUT_SOURCE)?;
    serde_json::from_value(result.remove(0))
        .map_err(|_| SessionError::InvalidResult(INVALID_INPUT_SOURCE))
}

fn parse_system_info(body: ResponseBody) -> SessionResult<SystemInfo> {
    let mut result = expect_result(body, 1, INVALID_SYSTEM_INFO)?;
    match result.remove(0) {
        Value::Object(map) => Ok(map),
        _ => Err(SessionError::InvalidResult(INVALID_SYSTEM_INFO)),
    }
}

fn parse_remote_controller_info(body: ResponseBody) -> SessionResult<RemoteControllerInfo> {
    let mut result = expect_result(body, 2, INVALID_REMOTE_CONTROLLER_INFO)?;
    let commands = serde_json::from_value(result.remove(1))
        .map_err(|_| SessionError::InvalidResult(INVALID_REMOTE_CONTROLLER_INFO))?;
    Ok(RemoteControllerInfo {
        metadata: result.remove(0),
        commands,
    })
}

fn parse_power_status(body: ResponseBody) -> SessionResult<PowerStatus> {
    let mut result = expect_result(body, 1, INVALID_POWER_STATUS)?;
    serde_json::from_value(result.remove(0))
        .map_err(|_| SessionError::InvalidResult(INVALID_POWER_STATUS))
}
