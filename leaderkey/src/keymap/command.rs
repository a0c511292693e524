//! Terminal actions of the binding tree.
//!
//! A `Command` names either a single host command (with optional `args`) or
//! an ordered batch in `commands`. Running them is the host's business and
//! goes through [`CommandHost`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chord::ChordPath;

/// One entry of a command batch: a bare command id, or an id with arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandStep {
    Name(String),
    WithArgs {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<Value>,
    },
}

impl CommandStep {
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Name(command) | Self::WithArgs { command, .. } => command,
        }
    }

    #[must_use]
    pub fn args(&self) -> Option<&Value> {
        match self {
            Self::Name(_) => None,
            Self::WithArgs { args, .. } => args.as_ref(),
        }
    }
}

/// A leaf of the binding tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    /// Path to reopen the menu at after the command runs. `None` means
    /// "inherit from the enclosing transient menu, or close".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goto: Option<ChordPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<CommandStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// A single host command call, borrowed from a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invocation<'a> {
    pub command: &'a str,
    pub args: Option<&'a Value>,
}

impl Command {
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: Some(command.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn batch(name: impl Into<String>, commands: Vec<CommandStep>) -> Self {
        Self {
            name: name.into(),
            commands: Some(commands),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    #[must_use]
    pub fn with_goto(mut self, goto: impl Into<ChordPath>) -> Self {
        self.goto = Some(goto.into());
        self
    }

    /// Whether this command runs as a batch. `commands` wins over `command`.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.commands.is_some()
    }

    /// The host calls this command expands to, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation<'_>> {
        match (&self.commands, &self.command) {
            (Some(steps), _) => steps
                .iter()
                .map(|step| Invocation {
                    command: step.command(),
                    args: step.args(),
                })
                .collect(),
            (None, Some(command)) => vec![Invocation {
                command,
                args: self.args.as_ref(),
            }],
            (None, None) => Vec::new(),
        }
    }
}

/// Host command-execution facility.
pub trait CommandHost {
    /// Run one host command, passing `args` through verbatim.
    fn execute_command(&mut self, command: &str, args: Option<&Value>) -> anyhow::Result<()>;

    /// Run a batch in order. Hosts with a native batch primitive override this.
    fn run_commands(&mut self, steps: &[Invocation<'_>]) -> anyhow::Result<()> {
        for step in steps {
            self.execute_command(step.command, step.args)?;
        }
        Ok(())
    }

    /// Show a short-lived message, e.g. for an unknown chord.
    fn notify(&mut self, message: &str) {
        log::info!("{message}");
    }
}
