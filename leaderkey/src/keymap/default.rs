//! Built-in default bindings.

use serde_json::json;

use super::command::{Command, CommandStep};
use super::trie::{RawBinding, RawBindings};

fn cmd(name: &str, command: &str) -> RawBinding {
    RawBinding::command(name, command)
}

/// The default raw tree, rooted at a single `SPC` leader.
#[must_use]
pub fn default_bindings() -> RawBindings {
    let mut root = RawBindings::new("root");
    root.insert("SPC", RawBinding::bindings(leader()));
    root
}

fn leader() -> RawBindings {
    let mut spc = RawBindings::new("<SPC>");
    spc.insert("SPC", cmd("Commands", "workbench.action.showCommands"));
    spc.insert("TAB", cmd("Last editor", "workbench.action.openPreviousRecentlyUsedEditor"));
    spc.insert("b", RawBinding::bindings(buffers()));
    spc.insert("f", RawBinding::bindings(files()));
    spc.insert("g", RawBinding::bindings(git()));
    spc.insert("w", RawBinding::bindings(windows()));
    spc.insert("m:rust", RawBinding::bindings(rust_major_mode()));
    spc.insert("m:markdown", RawBinding::bindings(markdown_major_mode()));
    spc.insert("q", RawBinding::bindings(quit()));
    spc
}

fn buffers() -> RawBindings {
    let mut menu = RawBindings::new("Buffers");
    menu.insert("b", cmd("Show all buffers", "workbench.action.showAllEditorsByMostRecentlyUsed"));
    menu.insert("d", cmd("Close buffer", "workbench.action.closeActiveEditor"));
    menu.insert("n", cmd("Next buffer", "workbench.action.nextEditor"));
    menu.insert("p", cmd("Previous buffer", "workbench.action.previousEditor"));
    menu.insert("N", cmd("New untitled buffer", "workbench.action.files.newUntitledFile"));
    menu.insert("Y", cmd("Copy buffer to clipboard", "editor.action.clipboardCopyAction"));
    menu
}

fn files() -> RawBindings {
    let mut menu = RawBindings::new("File");
    menu.insert("f", cmd("Open file/folder", "workbench.action.files.openFileFolder"));
    menu.insert("r", cmd("Open recent", "workbench.action.openRecent"));
    menu.insert("s", cmd("Save file", "workbench.action.files.save"));
    menu.insert("S", cmd("Save all files", "workbench.action.files.saveAll"));
    menu.insert(
        "y",
        RawBinding::Command(Command::batch(
            "Copy path of active file",
            vec![
                CommandStep::Name("workbench.action.files.copyPathOfActiveFile".into()),
                CommandStep::WithArgs {
                    command: "leaderkey.notify".into(),
                    args: Some(json!({"message": "Path copied"})),
                },
            ],
        )),
    );
    menu
}

fn git() -> RawBindings {
    let mut menu = RawBindings::new("Git");
    menu.insert("s", cmd("Status", "workbench.view.scm"));
    menu.insert("b", cmd("Checkout", "git.checkout"));
    menu.insert("c", cmd("Commit", "git.commit"));
    menu.insert("p", cmd("Push", "git.push"));
    menu
}

fn windows() -> RawBindings {
    let mut menu = RawBindings::new("Window");
    menu.insert("/", cmd("Split vertically", "workbench.action.splitEditorRight"));
    menu.insert("-", cmd("Split horizontally", "workbench.action.splitEditorDown"));
    menu.insert("d", cmd("Close window", "workbench.action.closeEditorsInGroup"));
    menu.insert("m", cmd("Maximize window", "workbench.action.toggleEditorWidths"));
    menu.insert(".", RawBinding::bindings(window_transient_state()));
    menu
}

fn window_transient_state() -> RawBindings {
    let mut menu = RawBindings::new_transient("Window transient state");
    menu.insert("h", cmd("Focus left", "workbench.action.focusLeftGroup"));
    menu.insert("j", cmd("Focus down", "workbench.action.focusBelowGroup"));
    menu.insert("k", cmd("Focus up", "workbench.action.focusAboveGroup"));
    menu.insert("l", cmd("Focus right", "workbench.action.focusRightGroup"));
    menu.insert("<left>", cmd("Shrink", "workbench.action.decreaseViewWidth"));
    menu.insert("<right>", cmd("Enlarge", "workbench.action.increaseViewWidth"));
    menu.insert("s", cmd("Split horizontally", "workbench.action.splitEditorDown"));
    menu.insert("v", cmd("Split vertically", "workbench.action.splitEditorRight"));
    menu.insert(
        "q",
        RawBinding::Command(Command {
            name: "Quit transient state".into(),
            goto: Some("".into()),
            ..Command::default()
        }),
    );
    menu
}

fn rust_major_mode() -> RawBindings {
    let mut menu = RawBindings::new("Rust");
    menu.insert("=", cmd("Format buffer", "editor.action.formatDocument"));
    menu.insert("r", cmd("Run", "rust-analyzer.run"));
    menu.insert("e", cmd("Expand macro", "rust-analyzer.expandMacro"));
    menu.insert(
        "g",
        RawBinding::Command(
            Command::new("Go to parent module", "rust-analyzer.parentModule").with_args(json!({"reveal": true})),
        ),
    );
    menu
}

fn markdown_major_mode() -> RawBindings {
    let mut menu = RawBindings::new("Markdown");
    menu.insert("p", cmd("Preview", "markdown.showPreviewToSide"));
    menu.insert("t", cmd("Toggle preview lock", "markdown.togglePreviewLock"));
    menu
}

fn quit() -> RawBindings {
    let mut menu = RawBindings::new("Quit");
    menu.insert("q", cmd("Close window", "workbench.action.closeWindow"));
    menu.insert("r", cmd("Reload window", "workbench.action.reloadWindow"));
    menu
}
