//! Previewer settings
//!
//! Read from `~/.quill-overlay.conf` (`%USERPROFILE%\.quill-overlay.conf`
//! on Windows): `key = value` lines, `#` starts a comment line.
//!
//! ```text
//! # quill-overlay
//! line-numbers = yes
//! tab-width = 2
//! theme = ~/themes/paper.toml
//! highlight = on
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OverlayError, Result};
use crate::syntax::ThemeSnapshot;

const CONFIG_FILE: &str = ".quill-overlay.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Show a line-number gutter
    pub show_line_numbers: bool,
    /// Columns per tab stop, 1 to 16
    pub tab_width: usize,
    /// Built-in theme name or path to a TOML theme file
    pub theme: String,
    /// Start with overlay decorations switched on
    pub highlight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_line_numbers: false,
            tab_width: 4,
            theme: "dark".to_string(),
            highlight: true,
        }
    }
}

impl Config {
    /// Where the config file lives, if a home directory is known
    pub fn config_path() -> Option<PathBuf> {
        let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        env::var_os(home).map(|dir| PathBuf::from(dir).join(CONFIG_FILE))
    }

    /// Settings from the default location, or the defaults if there is no
    /// readable file
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::parse(&fs::read_to_string(path)?);
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Settings from file contents; unknown keys and bad values are
    /// skipped, leaving the default in place
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::default();
        let settings = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='));

        for (key, value) in settings {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            match key.as_str() {
                "line-numbers" => config.show_line_numbers = parse_bool(value),
                "highlight" => config.highlight = parse_bool(value),
                "tab-width" => match value.parse::<usize>() {
                    Ok(width) => config.tab_width = width.clamp(1, 16),
                    Err(_) => tracing::warn!(value, "ignoring non-numeric tab-width"),
                },
                "theme" if !value.is_empty() => config.theme = value.to_string(),
                "theme" => {}
                _ => tracing::warn!(key = key.as_str(), "ignoring unknown config key"),
            }
        }
        config
    }

    /// The configured theme as a snapshot
    pub fn theme_snapshot(&self) -> Result<ThemeSnapshot> {
        resolve_theme(&self.theme)
    }
}

/// A built-in theme by name, else a TOML theme file at that path
pub fn resolve_theme(name_or_path: &str) -> Result<ThemeSnapshot> {
    if let Some(snapshot) = ThemeSnapshot::builtin(name_or_path) {
        return Ok(snapshot);
    }
    let path = Path::new(name_or_path);
    if !path.is_file() {
        return Err(OverlayError::Message(format!("unknown theme: {name_or_path}")));
    }
    ThemeSnapshot::load(path)
}

fn parse_bool(s: &str) -> bool {
    ["true", "yes", "on", "1"]
        .iter()
        .any(|word| s.eq_ignore_ascii_case(word))
}
