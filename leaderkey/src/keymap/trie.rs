//! Binding trees.
//!
//! Two shapes of the same tree live here:
//!
//! - [`RawBinding`] / [`RawBindings`]: what users and the defaults author.
//!   Child keys are free-form strings in either notation, optionally carrying
//!   a `:when` suffix, kept in document order.
//! - [`Binding`] / [`SubMenu`]: the canonical tree produced by
//!   [`normalize`](super::normalize::normalize). Keys are [`ChordKey`]s and every
//!   submenu carries its precomputed display entries per "when" condition.
//!
//! [`SubMenu::resolve`] walks the canonical tree along a [`ChordPath`].

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::chord::{ChordKey, ChordPath};
use super::command::{Command, CommandStep};

/// A node of an authored tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBinding {
    /// A submenu; always serialized with a `keys` table.
    Bindings(RawBindings),
    /// A terminal command.
    Command(Command),
}

/// An authored submenu.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawBindings {
    pub name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub transient: bool,
    pub keys: IndexMap<String, RawBinding>,
}

impl RawBindings {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transient: false,
            keys: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn new_transient(name: impl Into<String>) -> Self {
        Self {
            transient: true,
            ..Self::new(name)
        }
    }

    /// Insert or replace a child. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, binding: RawBinding) {
        self.keys.insert(key.into(), binding);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawBinding> {
        self.keys.get(key)
    }
}

impl RawBinding {
    #[must_use]
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::Command(Command::new(name, command))
    }

    #[must_use]
    pub fn bindings(bindings: RawBindings) -> Self {
        Self::Bindings(bindings)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Bindings(bindings) => &bindings.name,
            Self::Command(command) => &command.name,
        }
    }
}

impl Serialize for RawBinding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bindings(bindings) => bindings.serialize(serializer),
            Self::Command(command) => command.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawBindingVisitor)
    }
}

impl<'de> Deserialize<'de> for RawBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawBinding::deserialize(deserializer)? {
            RawBinding::Bindings(bindings) => Ok(bindings),
            RawBinding::Command(command) => Err(de::Error::custom(format!(
                "expected a submenu with `keys`, found command `{}`",
                command.name
            ))),
        }
    }
}

struct RawBindingVisitor;

impl<'de> Visitor<'de> for RawBindingVisitor {
    type Value = RawBinding;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a submenu (table with `keys`) or a command (table with `command` or `commands`)")
    }

    // The presence of `keys` decides the variant, once, here.
    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut name: Option<String> = None;
        let mut transient: Option<bool> = None;
        let mut keys: Option<IndexMap<String, RawBinding>> = None;
        let mut goto: Option<ChordPath> = None;
        let mut command: Option<String> = None;
        let mut commands: Option<Vec<CommandStep>> = None;
        let mut args: Option<Value> = None;

        while let Some(field) = map.next_key::<String>()? {
            match field.as_str() {
                "name" => name = Some(map.next_value()?),
                "transient" => transient = Some(map.next_value()?),
                "keys" => keys = Some(map.next_value()?),
                "goto" => goto = Some(map.next_value()?),
                "command" => command = Some(map.next_value()?),
                "commands" => commands = Some(map.next_value()?),
                "args" => args = Some(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let name = name.unwrap_or_default();
        match keys {
            Some(keys) => {
                if command.is_some() || commands.is_some() {
                    log::debug!("submenu `{name}` also names a command; the command is ignored");
                }
                Ok(RawBinding::Bindings(RawBindings {
                    name,
                    transient: transient.unwrap_or(false),
                    keys,
                }))
            }
            None => Ok(RawBinding::Command(Command {
                name,
                goto,
                command,
                commands,
                args,
            })),
        }
    }
}

/// A node of the canonical tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    SubMenu(SubMenu),
    Command(Command),
}

impl Binding {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::SubMenu(menu) => &menu.name,
            Self::Command(command) => &command.name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::SubMenu(_) => EntryKind::Binding,
            Self::Command(_) => EntryKind::Command,
        }
    }
}

/// A canonical submenu. Built by the normalizer, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMenu {
    pub(super) name: String,
    pub(super) transient: bool,
    pub(super) keys: BTreeMap<ChordKey, Binding>,
    /// Display entries per "when" condition; `""` is the unconditional view.
    pub(super) ordered_keys: BTreeMap<String, Vec<DisplayEntry>>,
}

/// What kind of child a display entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A submenu.
    Binding,
    Command,
}

impl EntryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binding => "binding",
            Self::Command => "command",
        }
    }
}

/// One line of a which-key menu, precomputed by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub key: String,
    pub name: String,
    pub kind: EntryKind,
    pub when: Option<String>,
}

impl DisplayEntry {
    pub(super) fn new(chord: &ChordKey, binding: &Binding) -> Self {
        Self {
            key: chord.key().to_string(),
            name: binding.name().to_string(),
            kind: binding.kind(),
            when: chord.when().map(str::to_string),
        }
    }
}

/// Outcome of walking the tree along a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The path ends inside a submenu: more keys are needed.
    Menu(&'a SubMenu),
    /// The path reached a command. `goto` is already filled in from the
    /// nearest transient submenu when the command has none of its own.
    Command(Command),
}

impl SubMenu {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &ChordKey) -> Option<&Binding> {
        self.keys.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = (&ChordKey, &Binding)> {
        self.keys.iter()
    }

    /// All precomputed views, keyed by condition (`""` for the default view).
    #[must_use]
    pub fn ordered_keys(&self) -> &BTreeMap<String, Vec<DisplayEntry>> {
        &self.ordered_keys
    }

    /// Display entries for `when`, falling back to the default view.
    #[must_use]
    pub fn entries(&self, when: Option<&str>) -> Option<&[DisplayEntry]> {
        when.and_then(|when| self.ordered_keys.get(when))
            .or_else(|| self.ordered_keys.get(""))
            .map(Vec::as_slice)
    }

    /// Child for `chord` under `when`: the conditional binding if there is
    /// one, else the unconditional one.
    fn lookup(&self, chord: &str, when: Option<&str>) -> Option<&Binding> {
        when.and_then(|when| self.keys.get(&ChordKey::with_when(chord, when)))
            .or_else(|| self.keys.get(&ChordKey::new(chord)))
    }

    /// Walk `path` from this submenu.
    ///
    /// Returns `None` for an unknown chord. Resolution stops at the first
    /// command; chords after it are not consulted.
    #[must_use]
    pub fn resolve(&self, path: &ChordPath, when: Option<&str>) -> Option<Resolved<'_>> {
        let mut node = self;
        let mut walked = ChordPath::new();
        let mut transient_anchor: Option<ChordPath> = None;

        for chord in path.chords() {
            walked.push(chord);
            match node.lookup(chord, when)? {
                Binding::Command(command) => {
                    if walked.len() < path.len() {
                        log::debug!("`{path}` continues past command `{}` at `{walked}`", command.name);
                    }
                    let mut command = command.clone();
                    if command.goto.is_none() {
                        command.goto = transient_anchor;
                    }
                    return Some(Resolved::Command(command));
                }
                Binding::SubMenu(menu) => {
                    if menu.transient {
                        transient_anchor = Some(walked.clone());
                    }
                    node = menu;
                }
            }
        }

        Some(Resolved::Menu(node))
    }
}

impl From<&SubMenu> for RawBindings {
    fn from(menu: &SubMenu) -> Self {
        Self {
            name: menu.name.clone(),
            transient: menu.transient,
            keys: menu
                .keys
                .iter()
                .map(|(chord, binding)| (chord.to_string(), RawBinding::from(binding)))
                .collect(),
        }
    }
}

impl From<&Binding> for RawBinding {
    fn from(binding: &Binding) -> Self {
        match binding {
            Binding::SubMenu(menu) => Self::Bindings(RawBindings::from(menu)),
            Binding::Command(command) => Self::Command(command.clone()),
        }
    }
}
