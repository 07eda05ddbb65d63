//! Configuration file support
//!
//! Loads settings from ~/.live-stylers.toml (or %USERPROFILE%\.live-stylers.toml
//! on Windows).
//!
//! Example:
//! ```text
//! highlightVariables = true
//! highlightHtml = true
//!
//! [variables]
//! debounce_ms = 1000
//! whole_seconds = false
//!
//! [theme]
//! selection_highlight = "#3a3d41"
//! search_highlight = "#613214"
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::clock::Debounce;
use crate::document::Settings;
use crate::error::{Result, StylerError};
use crate::style::{Color, Theme};
use crate::styler::{HIGHLIGHT_HTML, HIGHLIGHT_VARIABLES};

const CONFIG_FILE: &str = ".live-stylers.toml";

/// Configuration settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Highlight other occurrences of the word under the caret
    pub highlight_variables: bool,
    /// Highlight the tag pair around the caret
    pub highlight_html: bool,
    /// Quiet period before the variable highlighter searches
    pub debounce: Debounce,
    /// Highlight colors
    pub theme: Theme,
    /// Any other top-level boolean
    extra: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highlight_variables: true,
            highlight_html: true,
            debounce: Debounce::default(),
            theme: Theme::default(),
            extra: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(CONFIG_FILE))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(CONFIG_FILE))
        }
    }

    /// Load the user's configuration, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(StylerError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Debounce policy for the variable highlighter
    pub fn debounce(&self) -> Debounce {
        self.debounce
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Parse config file contents
    pub fn from_toml(contents: &str) -> Result<Self> {
        let table: toml::Table = contents.parse()?;
        let mut config = Config::default();

        for (key, value) in &table {
            match key.as_str() {
                HIGHLIGHT_VARIABLES => config.highlight_variables = expect_bool(key, value)?,
                HIGHLIGHT_HTML => config.highlight_html = expect_bool(key, value)?,
                "variables" => config.apply_variables(expect_table(key, value)?)?,
                "theme" => config.apply_theme(expect_table(key, value)?)?,
                _ => {
                    if let Some(b) = value.as_bool() {
                        config.extra.insert(key.clone(), b);
                    }
                }
            }
        }

        Ok(config)
    }

    fn apply_variables(&mut self, table: &toml::Table) -> Result<()> {
        if let Some(value) = table.get("debounce_ms") {
            let ms = value
                .as_integer()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| StylerError::InvalidSetting {
                    key: "variables.debounce_ms".to_string(),
                    expected: "a non-negative integer",
                })?;
            self.debounce.delay = Duration::from_millis(ms);
        }

        if let Some(value) = table.get("whole_seconds") {
            self.debounce.whole_seconds = expect_bool("variables.whole_seconds", value)?;
        }

        Ok(())
    }

    fn apply_theme(&mut self, table: &toml::Table) -> Result<()> {
        if let Some(value) = table.get("selection_highlight") {
            self.theme.selection_highlight = parse_color("theme.selection_highlight", value)?;
        }
        if let Some(value) = table.get("search_highlight") {
            self.theme.search_highlight = parse_color("theme.search_highlight", value)?;
        }
        Ok(())
    }
}

impl Settings for Config {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            HIGHLIGHT_VARIABLES => Some(self.highlight_variables),
            HIGHLIGHT_HTML => Some(self.highlight_html),
            _ => self.extra.get(key).copied(),
        }
    }
}

fn expect_bool(key: &str, value: &toml::Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| StylerError::InvalidSetting {
        key: key.to_string(),
        expected: "a boolean",
    })
}

fn expect_table<'a>(key: &str, value: &'a toml::Value) -> Result<&'a toml::Table> {
    value.as_table().ok_or_else(|| StylerError::InvalidSetting {
        key: key.to_string(),
        expected: "a table",
    })
}

fn parse_color(key: &str, value: &toml::Value) -> Result<Color> {
    let s = value.as_str().ok_or_else(|| StylerError::InvalidSetting {
        key: key.to_string(),
        expected: "a color string",
    })?;
    Color::parse(s)
}
