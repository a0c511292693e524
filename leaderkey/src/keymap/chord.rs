//! Chord keys and chord paths.
//!
//! A binding key is authored as `rawKey` or `rawKey:when`. The raw key may
//! itself be `:`, or contain a colon written `+:`, so the condition separator
//! is found by a small scanner instead of a plain split.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::notation;

/// Key of a submenu child: a chord plus an optional "when" condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChordKey {
    key: String,
    when: Option<String>,
}

impl ChordKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            when: None,
        }
    }

    #[must_use]
    pub fn with_when(key: impl Into<String>, when: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            when: Some(when.into()),
        }
    }

    /// Parse an authored binding key. Never fails: anything without a
    /// recognizable condition is taken whole as the raw key.
    #[must_use]
    pub fn parse(authored: &str) -> Self {
        let (key, when) = split_condition(authored);
        Self { key, when }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn when(&self) -> Option<&str> {
        self.when.as_deref()
    }

    /// The same key with its chord rewritten to internal notation.
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self {
            key: notation::to_internal(&self.key),
            when: self.when.clone(),
        }
    }
}

/// Find the last unescaped `:` that is not the first character and is
/// followed by a non-empty condition.
fn split_condition(authored: &str) -> (String, Option<String>) {
    let mut separator = None;
    let mut chars = authored.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '+' if chars.peek().is_some_and(|&(_, next)| next == ':') => {
                chars.next();
            }
            ':' if idx > 0 => separator = Some(idx),
            _ => {}
        }
    }

    if let Some(idx) = separator {
        let (head, tail) = authored.split_at(idx);
        let when = tail.strip_prefix(':').unwrap_or_default();
        if !when.is_empty() {
            return (unescape(head), Some(when.to_string()));
        }
    }
    (unescape(authored), None)
}

fn unescape(raw: &str) -> String {
    raw.replace("+:", ":")
}

impl fmt::Display for ChordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.when.is_none() && self.key == ":" {
            return f.write_str(":");
        }
        // a trailing `+` before the separator would read back as `+:`
        if self.when.is_some() && self.key.ends_with('+') {
            f.write_str(&notation::to_host(&self.key))?;
        } else {
            f.write_str(&self.key.replace(':', "+:"))?;
        }
        if let Some(when) = &self.when {
            write!(f, ":{when}")?;
        }
        Ok(())
    }
}

/// A sequence of chords, written space separated (`"SPC f f"`).
///
/// The empty path is the root of the tree: nothing pressed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChordPath(Vec<String>);

impl ChordPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn chords(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn push(&mut self, chord: impl Into<String>) {
        self.0.push(chord.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// A new path with `chord` appended.
    #[must_use]
    pub fn join(&self, chord: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(chord);
        path
    }
}

impl From<&str> for ChordPath {
    fn from(path: &str) -> Self {
        Self(path.split_whitespace().map(str::to_string).collect())
    }
}

impl From<String> for ChordPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl From<ChordPath> for String {
    fn from(path: ChordPath) -> Self {
        path.to_string()
    }
}

impl FromStr for ChordPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ChordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
