//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lk")]
#[command(about = "Resolve, render and replay leader-key bindings")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to `<config dir>/leaderkey/config.toml`)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Raw binding tree (TOML) replacing the built-in defaults
    #[arg(long, short = 't', global = true)]
    pub tree: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a chord path to a submenu or a command
    Resolve {
        /// Space separated chords, e.g. "SPC f f"
        path: String,
        /// Active "when" condition
        #[arg(long, short = 'w')]
        when: Option<String>,
    },
    /// Print the menu layout at a chord path
    Render {
        /// Space separated chords (root if omitted)
        #[arg(default_value = "")]
        path: String,
        #[arg(long, short = 'w')]
        when: Option<String>,
        /// Target line length (overrides `display.target_line_length`)
        #[arg(long)]
        width: Option<usize>,
    },
    /// Feed host-notation keys through a session, e.g. `space f f`
    Press {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long, short = 'w')]
        when: Option<String>,
    },
    /// Show the internal, host and description forms of a key
    #[command(alias = "describe")]
    Key { key: String },
    /// Print the effective canonical tree as TOML
    Dump,
}
