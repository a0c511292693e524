//! Raw tree to canonical tree.
//!
//! Keys are rewritten to internal notation and split into chord and
//! condition, submenu names get a `+` prefix, and every submenu gets its
//! display entries precomputed per condition.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use super::chord::ChordKey;
use super::trie::{Binding, DisplayEntry, RawBinding, RawBindings, SubMenu};

/// Normalize an authored tree. The root keeps its name as-is.
#[must_use]
pub fn normalize(raw: &RawBindings) -> SubMenu {
    normalize_menu(raw, raw.name.clone())
}

fn normalize_menu(raw: &RawBindings, name: String) -> SubMenu {
    let mut keys = BTreeMap::new();
    let mut order: Vec<ChordKey> = Vec::with_capacity(raw.keys.len());

    for (authored, binding) in &raw.keys {
        let chord = ChordKey::parse(authored).canonical();
        let binding = match binding {
            RawBinding::Bindings(child) => Binding::SubMenu(normalize_menu(child, submenu_name(&child.name))),
            RawBinding::Command(command) => Binding::Command(command.clone()),
        };
        if keys.insert(chord.clone(), binding).is_some() {
            log::warn!("`{authored}` in `{}` duplicates `{chord}`; the later definition wins", raw.name);
        } else {
            order.push(chord);
        }
    }

    let ordered_keys = display_views(&keys, &order);
    SubMenu {
        name,
        transient: raw.transient,
        keys,
        ordered_keys,
    }
}

fn submenu_name(name: &str) -> String {
    format!("+{}", name.trim_start_matches('+'))
}

/// Longer keys first, then lexicographic.
#[must_use]
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b))
}

fn display_views(keys: &BTreeMap<ChordKey, Binding>, order: &[ChordKey]) -> BTreeMap<String, Vec<DisplayEntry>> {
    let entries: Vec<DisplayEntry> = order
        .iter()
        .filter_map(|chord| keys.get(chord).map(|binding| DisplayEntry::new(chord, binding)))
        .collect();

    let unconditional: BTreeSet<&str> = entries
        .iter()
        .filter(|entry| entry.when.is_none())
        .map(|entry| entry.key.as_str())
        .collect();
    let conditions: BTreeSet<&str> = entries.iter().filter_map(|entry| entry.when.as_deref()).collect();

    let mut views = BTreeMap::new();

    let default_view = entries
        .iter()
        .filter(|entry| entry.when.is_none() || !unconditional.contains(entry.key.as_str()))
        .cloned()
        .collect();
    views.insert(String::new(), sorted(default_view));

    for when in conditions {
        let claimed: BTreeSet<&str> = entries
            .iter()
            .filter(|entry| entry.when.as_deref() == Some(when))
            .map(|entry| entry.key.as_str())
            .collect();
        let view = entries
            .iter()
            .filter(|entry| match entry.when.as_deref() {
                None => !claimed.contains(entry.key.as_str()),
                Some(other) => other == when,
            })
            .cloned()
            .collect();
        views.insert(when.to_string(), sorted(view));
    }

    views
}

fn sorted(mut entries: Vec<DisplayEntry>) -> Vec<DisplayEntry> {
    entries.sort_by(|a, b| compare_keys(&a.key, &b.key).then_with(|| a.when.cmp(&b.when)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::trie::EntryKind;

    fn keys_of(entries: &[DisplayEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| match &entry.when {
                Some(when) => format!("{}:{when}", entry.key),
                None => entry.key.clone(),
            })
            .collect()
    }

    #[test]
    fn compare_keys_orders_by_length_then_text() {
        let mut keys = vec!["a", "SPC", "<backspace>"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, ["<backspace>", "SPC", "a"]);

        let mut keys = vec!["b", "B", "a", "TAB"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, ["TAB", "B", "a", "b"]);
    }

    #[test]
    fn normalize_rewrites_keys_and_names() {
        let mut file = RawBindings::new("File");
        file.insert("shift+a", RawBinding::command("Upper", "upper"));
        let mut root = RawBindings::new("root");
        root.insert("space", RawBinding::bindings(file));

        let menu = normalize(&root);
        assert_eq!(menu.name(), "root");
        let Some(Binding::SubMenu(file)) = menu.get(&ChordKey::new("SPC")) else {
            panic!("expected SPC submenu");
        };
        assert_eq!(file.name(), "+File");
        assert!(file.get(&ChordKey::new("A")).is_some());
        assert!(file.get(&ChordKey::new("shift+a")).is_none());
    }

    #[test]
    fn normalize_does_not_double_prefix_names() {
        let mut inner = RawBindings::new("+Git");
        inner.insert("s", RawBinding::command("Status", "git.status"));
        let mut root = RawBindings::new("root");
        root.insert("g", RawBinding::bindings(inner));

        let menu = normalize(&root);
        let Some(Binding::SubMenu(git)) = menu.get(&ChordKey::new("g")) else {
            panic!("expected g submenu");
        };
        assert_eq!(git.name(), "+Git");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut window = RawBindings::new_transient("Window");
        window.insert("ctrl+h", RawBinding::command("Left", "left"));
        window.insert("a:foo", RawBinding::command("A foo", "a.foo"));
        window.insert("C-+::bar", RawBinding::command("Colon bar", "colon.bar"));
        window.insert("shift+=:foo", RawBinding::command("Plus foo", "plus.foo"));
        window.insert("ctrl+shift+=:bar", RawBinding::command("Ctrl plus bar", "ctrl.plus.bar"));
        let mut root = RawBindings::new("root");
        root.insert("SPC", RawBinding::bindings(window));
        root.insert("enter", RawBinding::command("Enter", "enter"));

        let once = normalize(&root);
        let twice = normalize(&RawBindings::from(&once));
        assert_eq!(once, twice);

        let Some(Binding::SubMenu(window)) = twice.get(&ChordKey::new("SPC")) else {
            panic!("expected SPC submenu");
        };
        assert_eq!(window.get(&ChordKey::with_when("+", "foo")).map(Binding::name), Some("Plus foo"));
        assert!(window.get(&ChordKey::new(":foo")).is_none());
    }

    #[test]
    fn later_duplicate_wins_and_keeps_first_position() {
        let mut root = RawBindings::new("root");
        root.insert("space", RawBinding::command("First", "first"));
        root.insert("z", RawBinding::command("Z", "z"));
        root.insert("SPC", RawBinding::command("Second", "second"));

        let menu = normalize(&root);
        assert_eq!(menu.len(), 2);
        assert_eq!(menu.get(&ChordKey::new("SPC")).map(Binding::name), Some("Second"));
        let entries = menu.entries(None).expect("default view");
        assert_eq!(keys_of(entries), ["SPC", "z"]);
        assert_eq!(entries[0].name, "Second");
    }

    #[test]
    fn display_views_shadow_unconditional_entries() {
        let mut root = RawBindings::new("root");
        root.insert("a", RawBinding::command("A", "a"));
        root.insert("a:foo", RawBinding::command("A foo", "a.foo"));
        root.insert("b:foo", RawBinding::command("B foo", "b.foo"));
        root.insert("a:bar", RawBinding::command("A bar", "a.bar"));
        root.insert("c", RawBinding::bindings(RawBindings::new("C")));

        let menu = normalize(&root);
        let views = menu.ordered_keys();
        assert_eq!(views.len(), 3);
        assert_eq!(keys_of(&views[""]), ["a", "b:foo", "c"]);
        assert_eq!(keys_of(&views["foo"]), ["a:foo", "b:foo", "c"]);
        assert_eq!(keys_of(&views["bar"]), ["a:bar", "c"]);
        assert_eq!(views["bar"][0].name, "A bar");
        assert_eq!(views["foo"][0].name, "A foo");

        let c = views[""].iter().find(|entry| entry.key == "c").expect("c entry");
        assert_eq!(c.kind, EntryKind::Binding);
        assert_eq!(c.name, "+C");
    }

    #[test]
    fn entries_fall_back_to_default_view() {
        let mut root = RawBindings::new("root");
        root.insert("a", RawBinding::command("A", "a"));
        let menu = normalize(&root);
        assert_eq!(menu.entries(Some("unknown")), menu.entries(None));
    }

    #[test]
    fn empty_submenu_has_empty_default_view() {
        let menu = normalize(&RawBindings::new("root"));
        assert_eq!(menu.entries(None), Some(&[][..]));
    }

    #[test]
    fn display_views_sort_each_condition() {
        let mut root = RawBindings::new("root");
        for key in ["a", "SPC", "<backspace>"] {
            root.insert(key, RawBinding::command(key, key));
        }
        let menu = normalize(&root);
        assert_eq!(keys_of(menu.entries(None).expect("default view")), ["<backspace>", "SPC", "a"]);
    }
}
