//! Plain-text rendering of library results for the terminal.

use bravia_core::{CapabilityTables, CommandOutcome, DirectOutput, DiscoveredDevice, ErrorCode};

/// Inputs as `label(title)`, one per line, `<NONAME>` for unlabeled inputs.
pub fn input_sources(tables: &CapabilityTables) -> String {
    tables
        .input_sources
        .iter()
        .map(|s| format!("{}({})", s.display_name(), s.title))
        .collect::<Vec<_>>()
        .join(", \n")
}

/// Remote button names, comma separated.
pub fn command_names(tables: &CapabilityTables) -> String {
    tables
        .remote_controller
        .commands
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full `-l` listing: inputs, buttons, then pretty system info JSON.
pub fn device_info(tables: &CapabilityTables) -> String {
    let system_info = serde_json::to_string_pretty(&tables.system_info)
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        "Available Input Source:\n{}\n\nAvailable Commands:\n{}\n\nDevice Info\n{}",
        input_sources(tables),
        command_names(tables),
        system_info
    )
}

/// One line per command outcome.
pub fn outcome(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Completed {
            command,
            output: DirectOutput::PowerStatus(status),
        } => format!("{}: ok (power {})", command, status.status),
        CommandOutcome::Completed { command, .. } => format!("{}: ok", command),
        CommandOutcome::Sent { command } => format!("{}: sent", command),
        CommandOutcome::Unavailable { command } => {
            format!("{}: not available for your device", command)
        }
        CommandOutcome::Failed { command, error } => {
            format!("{}: failed [{}] {}", command, error.code(), error)
        }
    }
}

/// One line per discovered device; missing fields print as `-`.
pub fn discovered_device(device: &DiscoveredDevice) -> String {
    format!(
        "{}\t{}\t{}",
        device.ip.as_deref().unwrap_or("-"),
        device.model.as_deref().unwrap_or("-"),
        device.uuid.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bravia_core::{InputSource, PowerStatus, RemoteCommand, SessionError};
    use serde_json::json;

    fn tables() -> CapabilityTables {
        let mut tables = CapabilityTables::default();
        tables.input_sources = vec![
            InputSource {
                uri: "extInput:hdmi?port=1".into(),
                title: "HDMI 1".into(),
                label: Some("DisplayPort".into()),
                connection: Some(true),
                icon: None,
            },
            InputSource {
                uri: "extInput:hdmi?port=2".into(),
                title: "HDMI 2".into(),
                label: None,
                connection: None,
                icon: None,
            },
        ];
        tables.remote_controller.commands = vec![
            RemoteCommand {
                name: "VolumeUp".into(),
                value: "AAAAAQAAAAEAAAASAw==".into(),
            },
            RemoteCommand {
                name: "Mute".into(),
                value: "AAAAAQAAAAEAAAAUAw==".into(),
            },
        ];
        tables
            .system_info
            .insert("model".into(), json!("KDL-50W800B"));
        tables
    }

    #[test]
    fn device_info_lists_inputs_commands_and_system_info() {
        let text = device_info(&tables());

        assert!(text.starts_with(
            "Available Input Source:\nDisplayPort(HDMI 1), \n<NONAME>(HDMI 2)"
        ));
        assert!(text.contains("Available Commands:\nVolumeUp, Mute"));
        assert!(text.contains("\"model\": \"KDL-50W800B\""));
    }

    #[test]
    fn outcome_lines_describe_each_kind() {
        let completed = CommandOutcome::Completed {
            command: "getPowerStatus()".into(),
            output: DirectOutput::PowerStatus(PowerStatus {
                status: "standby".into(),
            }),
        };
        assert_eq!(outcome(&completed), "getPowerStatus(): ok (power standby)");

        let failed = CommandOutcome::Failed {
            command: "setInputSource(HDMI 9)".into(),
            error: SessionError::InvalidInputSource("HDMI 9".into()),
        };
        assert!(outcome(&failed)
            .starts_with("setInputSource(HDMI 9): failed [invalid_input_source]"));

        let unavailable = CommandOutcome::Unavailable {
            command: "bogus()".into(),
        };
        assert_eq!(outcome(&unavailable), "bogus(): not available for your device");
    }

    #[test]
    fn discovered_device_fills_missing_fields() {
        let device = DiscoveredDevice {
            ip: Some("192.168.1.114".into()),
            uuid: None,
            model: Some("BRAVIA KDL-50W800B".into()),
        };
        assert_eq!(
            discovered_device(&device),
            "192.168.1.114\tBRAVIA KDL-50W800B\t-"
        );
    }
}
