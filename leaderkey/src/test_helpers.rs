//! Shared helpers for unit and integration tests.

use std::sync::Arc;

use serde_json::Value;

use crate::config::LeaderkeyConfig;
use crate::keymap::{default_bindings, CommandHost, Invocation, KeymapStore, LeaderKeyResult, LeaderKeymaps};

/// A host call, as recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Execute { command: String, args: Option<Value> },
    Batch(Vec<String>),
    Notify(String),
}

/// A `CommandHost` that records every call. Commands named `fail.*` fail.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    /// Commands executed one by one, batches flattened.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .iter()
            .flat_map(|call| match call {
                HostCall::Execute { command, .. } => vec![command.clone()],
                HostCall::Batch(commands) => commands.clone(),
                HostCall::Notify(_) => Vec::new(),
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Notify(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl CommandHost for RecordingHost {
    fn execute_command(&mut self, command: &str, args: Option<&Value>) -> anyhow::Result<()> {
        if command.starts_with("fail.") {
            anyhow::bail!("{command} failed");
        }
        self.calls.push(HostCall::Execute {
            command: command.to_string(),
            args: args.cloned(),
        });
        Ok(())
    }

    fn run_commands(&mut self, steps: &[Invocation<'_>]) -> anyhow::Result<()> {
        self.calls
            .push(HostCall::Batch(steps.iter().map(|step| step.command.to_string()).collect()));
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.calls.push(HostCall::Notify(message.to_string()));
    }
}

/// A session over the built-in defaults with `config` applied.
pub fn test_keymaps(config: &LeaderkeyConfig) -> LeaderKeymaps {
    let store = Arc::new(KeymapStore::new(default_bindings(), &config.overrides));
    LeaderKeymaps::new(store).with_config(config)
}

/// Feed host keys one by one, collecting every outcome.
pub fn press(keymaps: &mut LeaderKeymaps, host: &mut RecordingHost, keys: &[&str]) -> Vec<LeaderKeyResult> {
    keys.iter()
        .map(|key| keymaps.handle_key(key, host).expect("host should not fail"))
        .collect()
}
