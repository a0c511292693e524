//! Key notation translation.
//!
//! Bindings are stored in an Emacs-style notation (`C-M-S-x`, `SPC`,
//! `<backspace>`), while the host reports key events in a VSCode-style one
//! (`ctrl+alt+shift+x`, `space`, `backspace`). Shiftable characters never
//! carry an explicit `S-` internally: `shift+a` is stored as `A`.
//!
//! Translation is permissive: anything that is not recognized passes through
//! unchanged.

/// Unshifted characters, index-aligned with [`SHIFTED`].
const UNSHIFTED: &str = "abcdefghijklmnopqrstuvwxyz`1234567890-=,./[];'\\";
/// Shifted counterparts of [`UNSHIFTED`] on a US layout.
const SHIFTED: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ~!@#$%^&*()_+<>?{}:\"|";

/// Host name ↔ internal reserved word.
const SPECIAL_KEYS: &[(&str, &str)] = &[
    ("space", "SPC"),
    ("enter", "RET"),
    ("tab", "TAB"),
    ("escape", "ESC"),
];

/// Named keys written `<name>` internally and bare on the host side.
const BRACKET_KEYS: &[&str] = &[
    "backspace",
    "delete",
    "pageup",
    "pagedown",
    "up",
    "down",
    "left",
    "right",
    "home",
    "end",
];

/// Identifier-safe words for punctuation, used by [`to_description`].
const CHAR_WORDS: &[(char, &str)] = &[
    ('`', "backtick"),
    ('-', "dash"),
    ('=', "equal"),
    (',', "comma"),
    ('.', "period"),
    ('/', "slash"),
    ('[', "lbracket"),
    (']', "rbracket"),
    (';', "semicolon"),
    ('\'', "quote"),
    ('\\', "backslash"),
    ('~', "tilde"),
    ('!', "bang"),
    ('@', "at"),
    ('#', "hash"),
    ('$', "dollar"),
    ('%', "percent"),
    ('^', "caret"),
    ('&', "ampersand"),
    ('*', "asterisk"),
    ('(', "lparen"),
    (')', "rparen"),
    ('_', "underscore"),
    ('+', "plus"),
    ('<', "lt"),
    ('>', "gt"),
    ('?', "question"),
    ('{', "lbrace"),
    ('}', "rbrace"),
    (':', "colon"),
    ('"', "dquote"),
    ('|', "pipe"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    ctrl: bool,
    meta: bool,
    shift: bool,
}

#[derive(Debug, Clone, Copy)]
enum Modifier {
    Ctrl,
    Meta,
    Shift,
}

/// Modifier prefixes of both notations; matched case-insensitively.
const MODIFIER_PREFIXES: &[(&str, Modifier)] = &[
    ("c-", Modifier::Ctrl),
    ("ctrl+", Modifier::Ctrl),
    ("m-", Modifier::Meta),
    ("alt+", Modifier::Meta),
    ("s-", Modifier::Shift),
    ("shift+", Modifier::Shift),
];

impl Modifiers {
    fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Meta => self.meta = true,
            Modifier::Shift => self.shift = true,
        }
    }

    fn internal_prefix(self) -> String {
        let mut prefix = String::new();
        if self.ctrl {
            prefix.push_str("C-");
        }
        if self.meta {
            prefix.push_str("M-");
        }
        if self.shift {
            prefix.push_str("S-");
        }
        prefix
    }

    fn host_prefix(self) -> String {
        let mut prefix = String::new();
        if self.ctrl {
            prefix.push_str("ctrl+");
        }
        if self.meta {
            prefix.push_str("alt+");
        }
        if self.shift {
            prefix.push_str("shift+");
        }
        prefix
    }
}

/// Strip leading modifier tokens of either notation, in any order.
///
/// A prefix is only taken when something remains after it, so `-` and `S-`
/// on their own stay base keys.
fn split_modifiers(key: &str) -> (Modifiers, &str) {
    let mut modifiers = Modifiers::default();
    let mut rest = key;
    'outer: loop {
        for (prefix, modifier) in MODIFIER_PREFIXES {
            if rest.len() > prefix.len()
                && rest
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            {
                modifiers.set(*modifier);
                rest = rest.get(prefix.len()..).unwrap_or_default();
                continue 'outer;
            }
        }
        break;
    }
    (modifiers, rest)
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn shift_char(ch: char) -> Option<char> {
    let idx = UNSHIFTED.chars().position(|c| c == ch)?;
    SHIFTED.chars().nth(idx)
}

fn unshift_char(ch: char) -> Option<char> {
    let idx = SHIFTED.chars().position(|c| c == ch)?;
    UNSHIFTED.chars().nth(idx)
}

fn is_shifted(ch: char) -> bool {
    SHIFTED.contains(ch)
}

/// Whether `ch` is one of the shiftable characters, in either form.
#[must_use]
pub fn is_shiftable(ch: char) -> bool {
    UNSHIFTED.contains(ch) || SHIFTED.contains(ch)
}

/// Translate a key in host (or mixed) notation to internal notation.
///
/// `shift+a` becomes `A`, `ctrl+backspace` becomes `C-<backspace>`, and
/// already-internal keys are returned unchanged.
#[must_use]
pub fn to_internal(key: &str) -> String {
    let (mut modifiers, base) = split_modifiers(key);

    let base = match single_char(base) {
        Some(ch) if modifiers.shift && is_shifted(ch) => {
            modifiers.shift = false;
            ch.to_string()
        }
        Some(ch) if modifiers.shift => match shift_char(ch) {
            Some(shifted) => {
                modifiers.shift = false;
                shifted.to_string()
            }
            None => ch.to_string(),
        },
        _ => internal_name(base).unwrap_or_else(|| base.to_string()),
    };

    format!("{}{base}", modifiers.internal_prefix())
}

fn internal_name(base: &str) -> Option<String> {
    if let Some((_, word)) = SPECIAL_KEYS
        .iter()
        .find(|(host, _)| host.eq_ignore_ascii_case(base))
    {
        return Some((*word).to_string());
    }
    BRACKET_KEYS
        .iter()
        .find(|name| name.eq_ignore_ascii_case(base))
        .map(|name| format!("<{name}>"))
}

/// Translate a key in internal notation to host notation.
///
/// Shifted characters go back to their unshifted key plus `shift+`, so `A`
/// becomes `shift+a` and `C-{` becomes `ctrl+shift+[`.
#[must_use]
pub fn to_host(key: &str) -> String {
    let (mut modifiers, base) = split_modifiers(key);

    let base = match single_char(base).and_then(unshift_char) {
        Some(unshifted) => {
            modifiers.shift = true;
            unshifted.to_string()
        }
        None => host_name(base).unwrap_or(base).to_string(),
    };

    format!("{}{base}", modifiers.host_prefix())
}

fn host_name(base: &str) -> Option<&'static str> {
    if let Some((host, _)) = SPECIAL_KEYS.iter().find(|(_, word)| *word == base) {
        return Some(host);
    }
    let name = base.strip_prefix('<')?.strip_suffix('>')?;
    BRACKET_KEYS.iter().copied().find(|known| *known == name)
}

/// Describe a key with characters safe for file names and identifiers.
///
/// `C-\`` becomes `C-backtick`, `<backspace>` becomes `backspace`.
#[must_use]
pub fn to_description(key: &str) -> String {
    let internal = to_internal(key);
    let (modifiers, base) = split_modifiers(&internal);

    let word = single_char(base).and_then(|ch| {
        CHAR_WORDS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, word)| *word)
    });
    let base = match word {
        Some(word) => word,
        None => base
            .strip_prefix('<')
            .and_then(|name| name.strip_suffix('>'))
            .unwrap_or(base),
    };

    format!("{}{base}", modifiers.internal_prefix())
}
