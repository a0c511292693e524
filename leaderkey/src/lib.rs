//! Leaderkey - a leader-key command dispatcher with a which-key menu
//!
//! The user presses a leader key, the engine shows a menu of the next
//! possible keys with their labels, and on a terminal key it runs a command
//! (or a batch of commands) through the host.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leaderkey::{CommandHost, KeymapStore, LeaderKeyResult, LeaderKeymaps, LeaderkeyConfig};
//!
//! struct Host;
//!
//! impl CommandHost for Host {
//!     fn execute_command(&mut self, command: &str, _args: Option<&serde_json::Value>) -> anyhow::Result<()> {
//!         log::info!("run {command}");
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LeaderkeyConfig::load_default()?;
//!     let store = Arc::new(KeymapStore::from_config(&config));
//!     let mut keymaps = LeaderKeymaps::new(store).with_config(&config);
//!
//!     keymaps.open(Some("editorTextFocus"));
//!     for key in ["space", "f", "f"] {
//!         if let LeaderKeyResult::Dispatched { command, .. } = keymaps.handle_key(key, &mut Host)? {
//!             log::info!("dispatched {}", command.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! 1. Raw trees (defaults, user overrides) are merged, then normalized into a
//!    canonical tree with keys in one notation and display entries precomputed
//! 2. The canonical tree is shared through [`KeymapStore`] and replaced
//!    atomically when the configuration changes
//! 3. A [`LeaderKeymaps`] session resolves one host key at a time and
//!    renders the current submenu with [`layout`]

pub mod config;
pub mod error;
pub mod keymap;
pub mod layout;

#[cfg(test)]
mod test_helpers;

// Convenience re-exports
pub use config::LeaderkeyConfig;
pub use error::MergeError;
pub use keymap::{CommandHost, KeymapStore, LeaderKeyResult, LeaderKeymaps};
pub use layout::{Layout, LayoutOptions, TokenCategory};
