//! Leader-key configuration.
//!
//! Loaded from `<config dir>/leaderkey/config.toml` (`~/.config/leaderkey/config.toml`
//! on Linux). Holds the binding overrides, display tuning for the which-key
//! menu and logging settings for the `lk` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etcetera::base_strategy::{choose_base_strategy, BaseStrategy};
use serde::Deserialize;

use crate::keymap::Overrides;
use crate::layout::LayoutOptions;

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeaderkeyConfig {
    /// `[overrides.<group>]` tables of chord path → new name or binding.
    pub overrides: Overrides,
    /// Keep resolving keys but never show the menu.
    #[serde(alias = "hideLeaderkeyMenu")]
    pub hide_menu: bool,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Which-key menu display configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub target_line_length: usize,
    /// Cells the arrow glyph takes on screen: 1 or 2.
    pub arrow_width: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub level: String,
    pub suppressed_patterns: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let layout = LayoutOptions::default();
        Self {
            target_line_length: layout.target_line_length,
            arrow_width: layout.arrow_width,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            level: "warn".to_string(),
            suppressed_patterns: Vec::new(),
        }
    }
}

impl DisplayConfig {
    /// Layout options, with `arrow_width` clamped to 1..=2.
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        let arrow_width = self.arrow_width.clamp(1, 2);
        if arrow_width != self.arrow_width {
            log::warn!(
                "display.arrow_width = {} is out of range, using {arrow_width}",
                self.arrow_width
            );
        }
        LayoutOptions {
            target_line_length: self.target_line_length,
            arrow_width,
        }
    }
}

/// The `leaderkey` directory under the platform config directory.
pub fn config_dir() -> Result<PathBuf> {
    let strategy = choose_base_strategy().context("Unable to find the config directory")?;
    Ok(strategy.config_dir().join("leaderkey"))
}

impl LeaderkeyConfig {
    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the file doesn't exist.
    /// Returns an error only if the file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        let config_path = config_dir()?.join("config.toml");
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::debug!("No configuration at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str::<LeaderkeyConfig>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Add (or replace) one override entry.
    #[must_use]
    pub fn with_override(
        mut self,
        group: impl Into<String>,
        path: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.overrides
            .entry(group.into())
            .or_default()
            .insert(path.into(), value);
        self
    }

    /// Set whether the menu is hidden.
    #[must_use]
    pub fn with_hide_menu(mut self, hide_menu: bool) -> Self {
        self.hide_menu = hide_menu;
        self
    }

    /// Set the target line length of the menu layout.
    #[must_use]
    pub fn with_target_line_length(mut self, length: usize) -> Self {
        self.display.target_line_length = length;
        self
    }

    /// Set the arrow glyph width (1 or 2 cells).
    #[must_use]
    pub fn with_arrow_width(mut self, width: usize) -> Self {
        self.display.arrow_width = width;
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging.log_file = Some(path.into());
        self
    }

    /// Set the log level (e.g., "info", "debug", "warn").
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }
}
