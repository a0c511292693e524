//! Leader-key keymap.
//!
//! Bindings form a trie of submenus with commands at the leaves. Keys are
//! stored in Emacs-style notation (`SPC`, `C-x`, `<backspace>`), may carry a
//! `:when` condition, and submenus may be transient (the menu reopens after a
//! command run from inside them).
//!
//! The pipeline is: default raw tree + user overrides ([`merge`]) →
//! [`normalize`] → canonical [`SubMenu`] held by a [`KeymapStore`] →
//! [`LeaderKeymaps`], the per-session dispatcher driven one host key at a time.

pub mod chord;
pub mod command;
pub mod default;
pub mod merge;
pub mod normalize;
pub mod notation;
pub mod trie;

use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwap;

pub use chord::{ChordKey, ChordPath};
pub use command::{Command, CommandHost, CommandStep, Invocation};
pub use default::default_bindings;
pub use merge::{merge, MergeOutcome, OverrideValue, Overrides};
pub use normalize::normalize;
pub use trie::{Binding, DisplayEntry, EntryKind, RawBinding, RawBindings, Resolved, SubMenu};

use crate::config::LeaderkeyConfig;
use crate::error::MergeError;
use crate::layout::{self, Layout, LayoutOptions};

/// The effective canonical tree, replaced wholesale on configuration change.
///
/// Readers take a snapshot with [`load`](Self::load) and never see a
/// half-built tree.
#[derive(Debug)]
pub struct KeymapStore {
    defaults: RawBindings,
    tree: ArcSwap<SubMenu>,
}

impl KeymapStore {
    /// Build the canonical tree from `defaults` with `overrides` applied.
    #[must_use]
    pub fn new(defaults: RawBindings, overrides: &Overrides) -> Self {
        let MergeOutcome { tree, .. } = merge(&defaults, overrides);
        Self {
            tree: ArcSwap::from_pointee(normalize(&tree)),
            defaults,
        }
    }

    /// Built-in defaults with the configured overrides.
    #[must_use]
    pub fn from_config(config: &LeaderkeyConfig) -> Self {
        Self::new(default_bindings(), &config.overrides)
    }

    /// Rebuild from the defaults and new overrides, then swap the tree.
    ///
    /// Returns the override entries that were skipped.
    pub fn reload(&self, overrides: &Overrides) -> Vec<MergeError> {
        let MergeOutcome { tree, skipped } = merge(&self.defaults, overrides);
        self.tree.store(Arc::new(normalize(&tree)));
        log::debug!("Keymap reloaded ({} override entries skipped)", skipped.len());
        skipped
    }

    /// Snapshot of the current canonical tree.
    #[must_use]
    pub fn load(&self) -> Arc<SubMenu> {
        self.tree.load_full()
    }

    #[must_use]
    pub fn defaults(&self) -> &RawBindings {
        &self.defaults
    }
}

/// Result of feeding one key to [`LeaderKeymaps::handle_key`].
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderKeyResult {
    /// The path ends in a submenu; more keys are needed.
    Pending { path: ChordPath, name: String },
    /// A command was dispatched. The session now sits at `goto` (empty: closed).
    Dispatched { command: Command, goto: ChordPath },
    /// No binding for this path. The session is closed.
    NotFound(ChordPath),
    /// Escape closed the session.
    Cancelled,
}

/// Leader-key session.
///
/// Owns the chord path typed so far and the active "when" condition. A host
/// opens it on the leader key, then forwards every key event until it closes.
#[derive(Debug)]
pub struct LeaderKeymaps {
    store: Arc<KeymapStore>,
    path: ChordPath,
    when: Option<String>,
    active: bool,
    hide_menu: bool,
    layout: LayoutOptions,
}

impl LeaderKeymaps {
    #[must_use]
    pub fn new(store: Arc<KeymapStore>) -> Self {
        Self {
            store,
            path: ChordPath::new(),
            when: None,
            active: false,
            hide_menu: false,
            layout: LayoutOptions::default(),
        }
    }

    /// Apply the display settings of `config`.
    #[must_use]
    pub fn with_config(mut self, config: &LeaderkeyConfig) -> Self {
        self.hide_menu = config.hide_menu;
        self.layout = config.display.layout_options();
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_hidden_menu(mut self, hide_menu: bool) -> Self {
        self.hide_menu = hide_menu;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<KeymapStore> {
        &self.store
    }

    /// Start a session at the root.
    pub fn open(&mut self, when: Option<&str>) {
        self.open_at(ChordPath::new(), when);
    }

    /// Start a session at `path`, e.g. to reopen a transient menu.
    pub fn open_at(&mut self, path: ChordPath, when: Option<&str>) {
        self.path = path;
        self.when = when.map(str::to_string);
        self.active = true;
    }

    /// Whether a session is open.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn path(&self) -> &ChordPath {
        &self.path
    }

    #[must_use]
    pub fn when(&self) -> Option<&str> {
        self.when.as_deref()
    }

    /// Close the session.
    pub fn reset(&mut self) {
        self.path.clear();
        self.when = None;
        self.active = false;
    }

    /// Drop the last chord. The session stays open at the parent menu.
    pub fn back(&mut self) -> Option<String> {
        self.path.pop()
    }

    /// Feed one key event, in host notation.
    ///
    /// `escape` and `backspace` close the session and step back one chord,
    /// unless the current menu binds them. Unknown chords close the session
    /// and notify the host. Commands are dispatched to `host` after the
    /// session moved to their `goto` path.
    pub fn handle_key<H>(&mut self, host_key: &str, host: &mut H) -> anyhow::Result<LeaderKeyResult>
    where
        H: CommandHost + ?Sized,
    {
        let chord = notation::to_internal(host_key);
        let tree = self.store.load();
        let path = self.path.join(chord.as_str());

        let Some(resolved) = tree.resolve(&path, self.when.as_deref()) else {
            match chord.as_str() {
                "ESC" => {
                    self.reset();
                    return Ok(LeaderKeyResult::Cancelled);
                }
                "<backspace>" => {
                    self.back();
                    return Ok(self.current(&tree));
                }
                _ => {}
            }
            log::debug!("Unknown chord `{path}`");
            self.reset();
            host.notify(&format!("{path} is undefined"));
            return Ok(LeaderKeyResult::NotFound(path));
        };

        match resolved {
            Resolved::Menu(menu) => {
                let name = menu.name().to_string();
                self.path = path.clone();
                self.active = true;
                Ok(LeaderKeyResult::Pending { path, name })
            }
            Resolved::Command(command) => {
                let goto = command.goto.clone().unwrap_or_default();
                if goto.is_empty() {
                    self.reset();
                } else {
                    self.path = goto.clone();
                    self.active = true;
                }
                dispatch(&command, host)?;
                Ok(LeaderKeyResult::Dispatched { command, goto })
            }
        }
    }

    /// Where the session stands after stepping back.
    fn current(&mut self, tree: &SubMenu) -> LeaderKeyResult {
        match tree.resolve(&self.path, self.when.as_deref()) {
            Some(Resolved::Menu(menu)) => LeaderKeyResult::Pending {
                path: self.path.clone(),
                name: menu.name().to_string(),
            },
            _ => {
                let path = self.path.clone();
                self.reset();
                LeaderKeyResult::NotFound(path)
            }
        }
    }

    /// Lay out the menu at the current path.
    ///
    /// `None` when no session is open, the menu is hidden, or the path no
    /// longer leads to a submenu.
    #[must_use]
    pub fn render(&self) -> Option<Layout> {
        if !self.active || self.hide_menu {
            return None;
        }
        let tree = self.store.load();
        match tree.resolve(&self.path, self.when.as_deref()) {
            Some(Resolved::Menu(menu)) => Some(layout::render(menu, self.when.as_deref(), &self.layout)),
            _ => None,
        }
    }
}

fn dispatch<H>(command: &Command, host: &mut H) -> anyhow::Result<()>
where
    H: CommandHost + ?Sized,
{
    let invocations = command.invocations();
    if command.is_batch() {
        host.run_commands(&invocations)
            .with_context(|| format!("Failed to run `{}`", command.name))?;
    } else if let Some(call) = invocations.first() {
        host.execute_command(call.command, call.args)
            .with_context(|| format!("Failed to run `{}`", command.name))?;
    } else {
        log::debug!("`{}` has nothing to run", command.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl CommandHost for Recorder {
        fn execute_command(&mut self, command: &str, _args: Option<&serde_json::Value>) -> anyhow::Result<()> {
            self.calls.push(command.to_string());
            Ok(())
        }
    }

    fn build_test_keymaps() -> LeaderKeymaps {
        let mut view = RawBindings::new_transient("View");
        view.insert("z", RawBinding::command("Center", "view.center"));
        view.insert("t", RawBinding::command("Top", "view.top"));

        let mut goto = RawBindings::new("Goto");
        goto.insert("g", RawBinding::command("First line", "goto.first"));

        let mut root = RawBindings::new("root");
        root.insert("g", RawBinding::bindings(goto));
        root.insert("Z", RawBinding::bindings(view));
        root.insert("h", RawBinding::command("Left", "move.left"));

        let store = Arc::new(KeymapStore::new(root, &Overrides::new()));
        LeaderKeymaps::new(store)
    }

    #[test]
    fn dispatch_single_key() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(None);

        let result = km.handle_key("h", &mut host).expect("should dispatch");
        assert!(matches!(result, LeaderKeyResult::Dispatched { ref goto, .. } if goto.is_empty()));
        assert_eq!(host.calls, ["move.left"]);
        assert!(!km.is_pending());
    }

    #[test]
    fn dispatch_two_key_sequence() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(None);

        let result = km.handle_key("g", &mut host).expect("should resolve");
        assert!(matches!(result, LeaderKeyResult::Pending { ref name, .. } if name == "+Goto"));
        assert!(km.is_pending());

        let result = km.handle_key("g", &mut host).expect("should dispatch");
        assert!(matches!(result, LeaderKeyResult::Dispatched { .. }));
        assert_eq!(host.calls, ["goto.first"]);
    }

    #[test]
    fn dispatch_not_found_resets() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(None);
        km.handle_key("g", &mut host).expect("should resolve");

        let result = km.handle_key("x", &mut host).expect("should not fail");
        assert_eq!(result, LeaderKeyResult::NotFound(ChordPath::from("g x")));
        assert!(!km.is_pending());
        assert!(km.path().is_empty());
    }

    #[test]
    fn escape_cancels_pending() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(Some("editorTextFocus"));
        km.handle_key("g", &mut host).expect("should resolve");

        let result = km.handle_key("escape", &mut host).expect("should cancel");
        assert_eq!(result, LeaderKeyResult::Cancelled);
        assert!(!km.is_pending());
        assert_eq!(km.when(), None);
    }

    #[test]
    fn backspace_steps_back() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(None);
        km.handle_key("g", &mut host).expect("should resolve");

        let result = km.handle_key("backspace", &mut host).expect("should step back");
        assert!(matches!(result, LeaderKeyResult::Pending { ref path, ref name } if path.is_empty() && name == "root"));
        assert!(km.is_pending());
    }

    #[test]
    fn transient_menu_stays_open() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        km.open(None);
        km.handle_key("shift+z", &mut host).expect("should resolve");

        for key in ["z", "t", "z"] {
            let result = km.handle_key(key, &mut host).expect("should dispatch");
            assert!(matches!(result, LeaderKeyResult::Dispatched { ref goto, .. } if *goto == ChordPath::from("Z")));
            assert!(km.is_pending());
        }
        assert_eq!(host.calls, ["view.center", "view.top", "view.center"]);

        let result = km.handle_key("escape", &mut host).expect("should cancel");
        assert_eq!(result, LeaderKeyResult::Cancelled);
    }

    #[test]
    fn render_follows_session() {
        let mut km = build_test_keymaps();
        let mut host = Recorder::default();
        assert!(km.render().is_none());

        km.open(None);
        km.handle_key("g", &mut host).expect("should resolve");
        let layout = km.render().expect("menu is open");
        assert_eq!(layout.n_lines, 1);

        let mut hidden = build_test_keymaps().with_hidden_menu(true);
        hidden.open(None);
        assert!(hidden.render().is_none());
    }

    #[test]
    fn reload_swaps_tree() {
        let km = build_test_keymaps();
        let before = km.store().load();

        let mut overrides = Overrides::new();
        overrides
            .entry("user".into())
            .or_default()
            .insert("x".into(), serde_json::json!({"name": "X", "command": "x"}));
        let skipped = km.store().reload(&overrides);

        assert!(skipped.is_empty());
        assert!(before.get(&ChordKey::new("x")).is_none());
        assert!(km.store().load().get(&ChordKey::new("x")).is_some());
    }
}
