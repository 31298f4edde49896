//! Canned device responses and a recording transport for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::address::DeviceAddress;
use super::session::Session;
use super::traits::DeviceTransport;
use super::transport::{
    parse_response_body, DeviceRequest, RequestBody, ResponseBody, TransportResult,
};
use crate::protocol_constants::IRCC_ACTION;

pub const INPUT_SOURCES_RESPONSE: &str = r#"{"result":[[
    {"uri":"extInput:hdmi?port=1","title":"HDMI 1","connection":true,"label":"DisplayPort","icon":"meta:hdmi"},
    {"uri":"extInput:hdmi?port=2","title":"HDMI 2","connection":false,"label":"","icon":"meta:hdmi"},
    {"uri":"extInput:component?port=1","title":"Component","connection":false,"icon":"meta:component"}
]],"id":1}"#;

pub const SYSTEM_INFO_RESPONSE: &str = r#"{"result":[{
    "product":"TV","region":"GBR","language":"eng","model":"KDL-50W800B",
    "serial":"","macAddr":"fc:f1:52:00:00:01","name":"BRAVIA","generation":"2.4.0"
}],"id":2}"#;

pub const REMOTE_CONTROLLER_RESPONSE: &str = r#"{"result":[
    {"bundled":true,"type":"RM-J1100"},
    [
        {"name":"PowerOff","value":"AAAAAQAAAAEAAAAvAw=="},
        {"name":"VolumeUp","value":"AAAAAQAAAAEAAAASAw=="},
        {"name":"VolumeDown","value":"AAAAAQAAAAEAAAATAw=="},
        {"name":"Hdmi1","value":"AAAAAgAAABoAAABaAw=="},
        {"name":"WakeUp","value":"AAAAAQAAAAEAAAAuAw=="}
    ]
],"id":3}"#;

pub const POWER_STATUS_RESPONSE: &str = r#"{"result":[{"status":"active"}],"id":4}"#;

pub const SET_PLAY_CONTENT_RESPONSE: &str = r#"{"result":[],"id":5}"#;

/// Parses a fixture body, panicking on malformed fixtures.
pub fn json_body(text: &str) -> ResponseBody {
    parse_response_body(text).expect("fixture should parse")
}

type Responder = fn() -> TransportResult<ResponseBody>;

/// Fake transport that records every request and answers from fixtures.
///
/// Responses are keyed by RPC method name, or by `X_SendIRCC` for button
/// presses. Unknown methods answer with an empty body.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<DeviceRequest>>,
    overrides: HashMap<&'static str, Responder>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the response for one method.
    pub fn with_response(mut self, method: &'static str, responder: Responder) -> Self {
        self.overrides.insert(method, responder);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<DeviceRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Method names received so far (`X_SendIRCC` for button presses).
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| method_of(r).to_string())
            .collect()
    }
}

fn method_of(request: &DeviceRequest) -> &str {
    match &request.body {
        RequestBody::Rpc(rpc) => &rpc.method,
        RequestBody::Ircc(_) => IRCC_ACTION,
    }
}

fn default_response(method: &str) -> TransportResult<ResponseBody> {
    let body = match method {
        "getCurrentExternalInputsStatus" => json_body(INPUT_SOURCES_RESPONSE),
        "getSystemInformation" => json_body(SYSTEM_INFO_RESPONSE),
        "getRemoteControllerInfo" => json_body(REMOTE_CONTROLLER_RESPONSE),
        "getPowerStatus" => json_body(POWER_STATUS_RESPONSE),
        "setPlayContent" => json_body(SET_PLAY_CONTENT_RESPONSE),
        _ => ResponseBody::Empty,
    };
    Ok(body)
}

#[async_trait]
impl DeviceTransport for RecordingTransport {
    async fn post(&self, request: DeviceRequest) -> TransportResult<ResponseBody> {
        let method = method_of(&request).to_string();
        self.requests.lock().unwrap().push(request);

        match self.overrides.get(method.as_str()) {
            Some(responder) => responder(),
            None => default_response(&method),
        }
    }
}

/// Session bound to `192.168.1.114` with PSK `0000` over `transport`.
pub fn session_with(transport: &Arc<RecordingTransport>) -> Session {
    let address = DeviceAddress::parse("192.168.1.114").expect("valid address");
    Session::with_transport(address, Some("0000".to_string()), transport.clone())
}
