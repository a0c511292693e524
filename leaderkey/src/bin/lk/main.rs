//! Entry point for the lk binary.

mod args;
mod tracing_setup;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use leaderkey::keymap::notation;
use leaderkey::keymap::{default_bindings, ChordPath, CommandHost, RawBindings, Resolved};
use leaderkey::layout::{self, LayoutOptions};
use leaderkey::{KeymapStore, LeaderKeyResult, LeaderKeymaps, LeaderkeyConfig, TokenCategory};

use args::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LeaderkeyConfig::load_from(path)?,
        None => LeaderkeyConfig::load_default().unwrap_or_else(|err| {
            eprintln!("Warning: failed to load config.toml: {err:#}");
            eprintln!("Using default configuration");
            LeaderkeyConfig::default()
        }),
    };

    tracing_setup::init(&config.logging);

    let defaults = match &cli.tree {
        Some(path) => load_tree(path)?,
        None => default_bindings(),
    };
    let store = Arc::new(KeymapStore::new(defaults, &config.overrides));
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Resolve { path, when } => resolve(&store, &path, when.as_deref(), &mut out),
        Command::Render { path, when, width } => {
            let mut options = config.display.layout_options();
            if let Some(width) = width {
                options.target_line_length = width;
            }
            render(&store, &path, when.as_deref(), &options, &mut out)
        }
        Command::Press { keys, when } => {
            let mut session = LeaderKeymaps::new(store).with_config(&config);
            press(&mut session, &keys, when.as_deref(), &mut out)
        }
        Command::Key { key } => describe(&key, &mut out),
        Command::Dump => dump(&store, &mut out),
    }
}

fn load_tree(path: &Path) -> Result<RawBindings> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse binding tree {}", path.display()))
}

/// Chords typed in either notation, rewritten to internal notation.
fn chord_path(path: &str) -> ChordPath {
    let mut chords = ChordPath::new();
    for chord in path.split_whitespace() {
        chords.push(notation::to_internal(chord));
    }
    chords
}

fn show_args(args: Option<&Value>) -> String {
    args.map(|args| format!(" {args}")).unwrap_or_default()
}

fn resolve(store: &KeymapStore, path: &str, when: Option<&str>, out: &mut impl Write) -> Result<()> {
    let path = chord_path(path);
    let tree = store.load();
    match tree.resolve(&path, when) {
        None => writeln!(out, "{path}: undefined")?,
        Some(Resolved::Menu(menu)) => writeln!(out, "{path}: submenu {} ({} keys)", menu.name(), menu.len())?,
        Some(Resolved::Command(command)) => {
            writeln!(out, "{path}: command {}", command.name)?;
            for call in command.invocations() {
                writeln!(out, "  run {}{}", call.command, show_args(call.args))?;
            }
            if let Some(goto) = &command.goto {
                writeln!(out, "  goto \"{goto}\"")?;
            }
        }
    }
    Ok(())
}

fn render(
    store: &KeymapStore,
    path: &str,
    when: Option<&str>,
    options: &LayoutOptions,
    out: &mut impl Write,
) -> Result<()> {
    let path = chord_path(path);
    let tree = store.load();
    let Some(Resolved::Menu(menu)) = tree.resolve(&path, when) else {
        anyhow::bail!("`{path}` is not a submenu");
    };

    let layout = layout::render(menu, when, options);
    writeln!(out, "{} ({} lines, {} columns wide)", menu.name(), layout.n_lines, layout.max_line_length)?;
    writeln!(out, "{}", layout.plain_text())?;
    for category in TokenCategory::ALL {
        writeln!(out, "\n[{}]", category.as_str())?;
        writeln!(out, "{}", layout.text(category))?;
    }
    Ok(())
}

/// Prints host commands instead of running them.
struct PrintHost<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> CommandHost for PrintHost<'_, W> {
    fn execute_command(&mut self, command: &str, args: Option<&Value>) -> Result<()> {
        writeln!(self.out, "  run {command}{}", show_args(args))?;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        if let Err(err) = writeln!(self.out, "  notice: {message}") {
            log::warn!("Failed to print notice: {err}");
        }
    }
}

fn press(session: &mut LeaderKeymaps, keys: &[String], when: Option<&str>, out: &mut impl Write) -> Result<()> {
    session.open(when);
    for key in keys {
        let mut host = PrintHost { out: &mut *out };
        match session.handle_key(key, &mut host)? {
            LeaderKeyResult::Pending { path, name } => writeln!(out, "{key}: {path} {name}")?,
            LeaderKeyResult::Dispatched { command, goto } => {
                writeln!(out, "{key}: dispatched {}", command.name)?;
                if !goto.is_empty() {
                    writeln!(out, "  reopen at \"{goto}\"")?;
                }
            }
            LeaderKeyResult::NotFound(path) => writeln!(out, "{key}: {path} undefined")?,
            LeaderKeyResult::Cancelled => writeln!(out, "{key}: cancelled")?,
        }
    }

    if let Some(layout) = session.render() {
        writeln!(out, "\n{}", layout.plain_text())?;
    }
    Ok(())
}

fn describe(key: &str, out: &mut impl Write) -> Result<()> {
    let internal = notation::to_internal(key);
    writeln!(out, "internal:    {internal}")?;
    writeln!(out, "host:        {}", notation::to_host(&internal))?;
    writeln!(out, "description: {}", notation::to_description(&internal))?;
    Ok(())
}

fn dump(store: &KeymapStore, out: &mut impl Write) -> Result<()> {
    let tree = store.load();
    let raw = RawBindings::from(&*tree);
    let content = toml::to_string_pretty(&raw).context("Failed to serialize the binding tree")?;
    write!(out, "{content}")?;
    Ok(())
}
