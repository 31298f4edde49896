//! Capability table types reported by the television.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol_constants::POWER_STATUS_ACTIVE;

/// Opaque system information (model, firmware, MAC address, ...).
pub type SystemInfo = Map<String, Value>;

/// An external input as reported by `getCurrentExternalInputsStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    /// Content URI passed to `setPlayContent` (e.g. `extInput:hdmi?port=1`).
    pub uri: String,
    /// Fixed input title (e.g. `HDMI 1`).
    pub title: String,
    /// User-assigned label; absent or empty when the user never named it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether something is plugged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<bool>,
    /// Device icon hint (e.g. `meta:hdmi`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl InputSource {
    /// Returns the name shown to users: the label, or `<NONAME>` when unset.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => "<NONAME>",
        }
    }
}

/// One remote-control button: name and opaque IRCC code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Button name (e.g. `VolumeUp`).
    pub name: String,
    /// Base64-looking IRCC code sent verbatim.
    pub value: String,
}

/// Remote-controller catalog from `getRemoteControllerInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteControllerInfo {
    /// Catalog metadata (result element 0), kept as reported.
    #[serde(rename = "type")]
    pub metadata: Value,
    /// Available buttons (result element 1).
    pub commands: Vec<RemoteCommand>,
}

impl RemoteControllerInfo {
    /// Finds a button by exact name; the first match wins on duplicates.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RemoteCommand> {
        self.commands.iter().find(|c| c.name == name)
    }
}

/// Power state from `getPowerStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerStatus {
    /// Raw status string (`active` or `standby`).
    pub status: String,
}

impl PowerStatus {
    /// Returns true if the display is on.
    #[must_use]
    pub fn is_power_on(&self) -> bool {
        self.status == POWER_STATUS_ACTIVE
    }
}

/// Capability snapshot cached by a session at connect time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityTables {
    /// External inputs.
    pub input_sources: Vec<InputSource>,
    /// Device information.
    pub system_info: SystemInfo,
    /// Remote-controller button catalog.
    pub remote_controller: RemoteControllerInfo,
}

impl CapabilityTables {
    /// Finds an input by exact label equality.
    #[must_use]
    pub fn find_input(&self, label: &str) -> Option<&InputSource> {
        self.input_sources
            .iter()
            .find(|s| s.label.as_deref() == Some(label))
    }

    /// Finds a remote button by exact name.
    #[must_use]
    pub fn find_command(&self, name: &str) -> Option<&RemoteCommand> {
        self.remote_controller.find(name)
    }
}
