//! User overrides applied onto the default raw tree.
//!
//! Overrides are grouped (`[overrides.<group>]`) and addressed by a space
//! separated chord path. A string value renames, a table value replaces.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::chord::ChordKey;
use super::trie::{RawBinding, RawBindings};
use crate::error::MergeError;

/// Override groups, each a map from chord path to value.
///
/// Both levels are sorted, which fixes the application order.
pub type Overrides = BTreeMap<String, BTreeMap<String, Value>>;

/// A validated override value.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideValue {
    /// Rename the submenu at the path, or put an empty submenu there.
    Rename(String),
    /// Replace whatever is at the path.
    Replace(RawBinding),
}

impl OverrideValue {
    /// Validate a configuration value; `key` names it in errors.
    pub fn from_value(key: &str, value: &Value) -> Result<Self, MergeError> {
        match value {
            Value::String(name) => Ok(Self::Rename(name.clone())),
            Value::Object(_) => RawBinding::deserialize(value)
                .map(Self::Replace)
                .map_err(|err| MergeError::InvalidValue {
                    key: key.to_string(),
                    found: format!("a malformed table ({err})"),
                }),
            other => Err(MergeError::InvalidValue {
                key: key.to_string(),
                found: value_kind(other).to_string(),
            }),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

/// Result of [`merge`]: the effective raw tree and the entries that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub tree: RawBindings,
    pub skipped: Vec<MergeError>,
}

/// Apply `overrides` onto a copy of `defaults`.
///
/// A malformed entry is logged and skipped; the remaining entries still apply.
#[must_use]
pub fn merge(defaults: &RawBindings, overrides: &Overrides) -> MergeOutcome {
    let mut tree = defaults.clone();
    let mut skipped = Vec::new();

    for (group, entries) in overrides {
        for (path, value) in entries {
            let key = format!("overrides.{group}.\"{path}\"");
            if let Err(err) = apply_override(&mut tree, &key, path, value) {
                log::warn!("Skipping override {err}");
                skipped.push(err);
            }
        }
    }

    MergeOutcome { tree, skipped }
}

/// Apply a single override at `path`.
pub fn apply_override(tree: &mut RawBindings, key: &str, path: &str, value: &Value) -> Result<(), MergeError> {
    let tokens: Vec<&str> = path.split_whitespace().collect();
    let Some((last, parents)) = tokens.split_last() else {
        return Err(MergeError::EmptyPath { key: key.to_string() });
    };
    let value = OverrideValue::from_value(key, value)?;

    let mut node = tree;
    for token in parents {
        node = descend(node, token).ok_or_else(|| MergeError::NotSubmenu {
            key: key.to_string(),
            token: (*token).to_string(),
        })?;
    }
    let slot = find_slot(node, last).unwrap_or_else(|| (*last).to_string());

    match value {
        OverrideValue::Rename(name) => {
            if let Some(RawBinding::Bindings(menu)) = node.keys.get_mut(&slot) {
                log::debug!("{key}: renaming `{}` to `{name}`", menu.name);
                menu.name = name;
                return Ok(());
            }
            if let Some(old) = node.keys.insert(slot, RawBinding::Bindings(RawBindings::new(name))) {
                log_overwrite(key, &old);
            }
        }
        OverrideValue::Replace(binding) => {
            if let Some(old) = node.keys.insert(slot, binding) {
                log_overwrite(key, &old);
            }
        }
    }
    Ok(())
}

fn log_overwrite(key: &str, old: &RawBinding) {
    log::warn!("{key}: overriding `{}`", old.name());
    log::debug!("{key}: previous value {old:?}");
}

/// The child submenu at `token`, created as `"{token}..."` when missing.
///
/// A command bound at `token` is replaced by the new submenu.
fn descend<'a>(node: &'a mut RawBindings, token: &str) -> Option<&'a mut RawBindings> {
    let placeholder = || RawBinding::Bindings(RawBindings::new(format!("{token}...")));
    let slot = find_slot(node, token).unwrap_or_else(|| token.to_string());

    let entry = node.keys.entry(slot).or_insert_with(placeholder);
    if let RawBinding::Command(command) = entry {
        log::warn!("Replacing command `{}` at `{token}` with a submenu", command.name);
        *entry = placeholder();
    }
    match entry {
        RawBinding::Bindings(menu) => Some(menu),
        RawBinding::Command(_) => None,
    }
}

/// The existing raw key addressing the same chord as `token`, in any notation.
fn find_slot(node: &RawBindings, token: &str) -> Option<String> {
    if node.keys.contains_key(token) {
        return Some(token.to_string());
    }
    let wanted = ChordKey::parse(token).canonical();
    node.keys
        .keys()
        .rev()
        .find(|authored| ChordKey::parse(authored).canonical() == wanted)
        .cloned()
}
