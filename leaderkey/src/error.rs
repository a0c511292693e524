//! Error types.

use thiserror::Error;

/// A single override entry that could not be applied.
///
/// `key` is the full configuration key, e.g. `overrides.bindings."SPC f"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("{key}: empty key path")]
    EmptyPath { key: String },
    #[error("{key}: expected a new name (string) or a binding (table), found {found}")]
    InvalidValue { key: String, found: String },
    #[error("{key}: `{token}` does not lead to a submenu")]
    NotSubmenu { key: String, token: String },
}

impl MergeError {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::EmptyPath { key } | Self::InvalidValue { key, .. } | Self::NotSubmenu { key, .. } => key,
        }
    }
}
