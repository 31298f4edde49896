//! Command batch resolution and execution.
//!
//! Raw command strings are resolved against a session's cached tables into
//! [`CommandDescriptor`]s, then executed strictly in order. Each command gets
//! its own [`CommandOutcome`]; one failure never stops the batch.

use super::session::{Session, SessionError};
use super::types::{CapabilityTables, PowerStatus, RemoteCommand};

// ─────────────────────────────────────────────────────────────────────────────
// Direct Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Session operations reachable through `name(args)` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectOperation {
    /// `setInputSource(label)`
    SetInputSource,
    /// `getPowerStatus()`
    GetPowerStatus,
}

impl DirectOperation {
    /// Every direct operation, in declaration order.
    pub const ALL: [DirectOperation; 2] = [Self::SetInputSource, Self::GetPowerStatus];

    /// Name used in command strings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SetInputSource => "setInputSource",
            Self::GetPowerStatus => "getPowerStatus",
        }
    }

    /// Looks up an operation by its exact command name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Direct operations a dispatcher is allowed to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAllowList(Vec<DirectOperation>);

impl DirectAllowList {
    #[must_use]
    pub fn new(operations: Vec<DirectOperation>) -> Self {
        Self(operations)
    }

    /// Allows nothing; every `name(args)` string stays unresolved.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn contains(&self, operation: DirectOperation) -> bool {
        self.0.contains(&operation)
    }

    /// Looks up `name`, returning the operation only if it is allowed.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<DirectOperation> {
        DirectOperation::from_name(name).filter(|op| self.contains(*op))
    }
}

impl Default for DirectAllowList {
    fn default() -> Self {
        Self(DirectOperation::ALL.to_vec())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptors & Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved command, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandDescriptor {
    /// Bound session operation with verbatim arguments.
    Direct {
        name: String,
        operation: DirectOperation,
        args: Vec<String>,
    },
    /// Remote-controller button from the device catalog.
    Remote { command: RemoteCommand },
    /// Matched nothing; executes as a no-op.
    Unresolved { raw: String },
}

impl CommandDescriptor {
    /// Human-readable form of the command, used to label outcomes.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Direct { name, args, .. } => format!("{}({})", name, args.join(",")),
            Self::Remote { command } => command.name.clone(),
            Self::Unresolved { raw } => raw.clone(),
        }
    }
}

/// Value produced by a completed direct operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectOutput {
    None,
    PowerStatus(PowerStatus),
}

/// Result of one command in a batch.
#[derive(Debug)]
pub enum CommandOutcome {
    /// Direct operation succeeded.
    Completed { command: String, output: DirectOutput },
    /// IRCC code was sent; the device reply is not interpreted.
    Sent { command: String },
    /// Command matched nothing available on this device.
    Unavailable { command: String },
    /// Direct operation failed.
    Failed { command: String, error: SessionError },
}

impl CommandOutcome {
    /// The command this outcome belongs to.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Completed { command, .. }
            | Self::Sent { command }
            | Self::Unavailable { command }
            | Self::Failed { command, .. } => command,
        }
    }

    /// Returns true for `Completed` and `Sent`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Sent { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Splits `name(arg1,arg2)` into its name and verbatim arguments.
///
/// The name is the text before the first `(` with leading whitespace dropped.
/// Trailing whitespace is kept, so `foo (x)` names `"foo "`. The name may not
/// be empty or contain `)`. The string must end with `)`. `name()` yields one empty
/// argument.
fn parse_call(raw: &str) -> Option<(&str, Vec<String>)> {
    let open = raw.find('(')?;
    let name = raw[..open].trim_start();
    if name.is_empty() || name.contains(')') {
        return None;
    }

    let inner = raw[open + 1..].strip_suffix(')')?;
    let args = inner.split(',').map(str::to_string).collect();
    Some((name, args))
}

/// Resolves and runs command batches against a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    allow_list: DirectAllowList,
}

impl Dispatcher {
    #[must_use]
    pub fn new(allow_list: DirectAllowList) -> Self {
        Self { allow_list }
    }

    /// Resolves one raw command. Catalog names win over function syntax.
    #[must_use]
    pub fn resolve_one(&self, tables: &CapabilityTables, raw: String) -> CommandDescriptor {
        if let Some(command) = tables.find_command(&raw) {
            return CommandDescriptor::Remote {
                command: command.clone(),
            };
        }

        if let Some((name, args)) = parse_call(&raw) {
            if let Some(operation) = self.allow_list.lookup(name) {
                return CommandDescriptor::Direct {
                    name: name.to_string(),
                    operation,
                    args,
                };
            }
        }

        CommandDescriptor::Unresolved { raw }
    }

    /// Resolves a batch without performing any I/O.
    #[must_use]
    pub fn resolve(&self, tables: &CapabilityTables, raw: Vec<String>) -> Vec<CommandDescriptor> {
        raw.into_iter()
            .map(|r| self.resolve_one(tables, r))
            .collect()
    }

    /// Executes descriptors strictly in order, one outcome per descriptor.
    pub async fn run(
        &self,
        session: &mut Session,
        descriptors: Vec<CommandDescriptor>,
    ) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let command = descriptor.label();
            let outcome = match descriptor {
                CommandDescriptor::Direct {
                    operation, args, ..
                } => match run_direct(session, operation, &args).await {
                    Ok(output) => CommandOutcome::Completed { command, output },
                    Err(error) => {
                        log::warn!("[Dispatch] {} failed: {}", command, error);
                        CommandOutcome::Failed { command, error }
                    }
                },
                CommandDescriptor::Remote { command: remote } => {
                    session.send_ircc(&remote).await;
                    CommandOutcome::Sent { command }
                }
                CommandDescriptor::Unresolved { .. } => {
                    log::warn!(
                        "[Dispatch] Command '{}' is not available for this device",
                        command
                    );
                    CommandOutcome::Unavailable { command }
                }
            };

            log::info!("[Dispatch] {:?}", outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Resolves `raw` against the session's tables and runs the batch.
    pub async fn execute(&self, session: &mut Session, raw: Vec<String>) -> Vec<CommandOutcome> {
        if raw.is_empty() {
            return Vec::new();
        }

        log::debug!("[Dispatch] Executing {} command(s)", raw.len());
        let descriptors = self.resolve(session.capabilities(), raw);
        self.run(session, descriptors).await
    }
}

async fn run_direct(
    session: &mut Session,
    operation: DirectOperation,
    args: &[String],
) -> Result<DirectOutput, SessionError> {
    match operation {
        DirectOperation::SetInputSource => {
            let label = args.first().map(String::as_str).unwrap_or_default();
            session.set_input_source(label).await?;
            Ok(DirectOutput::None)
        }
        DirectOperation::GetPowerStatus => {
            let status = session.get_power_status().await?;
            Ok(DirectOutput::PowerStatus(status))
        }
    }
}
