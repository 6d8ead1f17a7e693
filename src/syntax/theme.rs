//! Theme snapshots and style resolution
//!
//! A `ThemeSnapshot` is the host's flat token map. `StyleResolver` reads it
//! once, at construction, into a style per category. When the host's theme
//! changes, build a new resolver from the new snapshot.
//!
//! Token names per category `<name>`:
//! - `<name>-color` (required): `#rrggbb`, `#rgb` or an ANSI color name
//! - `<name>-weight` (optional): `normal` or `bold`
//! - `<name>-style` (optional): `normal`, `italic` or `underline`
//!
//! `block-background-color` sets the background; every other color sets the
//! foreground.

use std::collections::BTreeMap;
use std::path::Path;

use super::category::Category;
use super::style::{Color, Style};
use crate::error::{OverlayError, Result};

/// Flat map of style token names to values, as provided by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeSnapshot {
    name: String,
    tokens: BTreeMap<String, String>,
}

impl ThemeSnapshot {
    /// Create a snapshot from name/value pairs
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            tokens: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a TOML theme document
    ///
    /// ```toml
    /// name = "solarized"
    ///
    /// [tokens]
    /// delimiter-color = "#586e75"
    /// delimiter-weight = "bold"
    /// ```
    ///
    /// Non-string token values are rejected rather than coerced.
    pub fn from_toml(text: &str) -> Result<Self> {
        let table: toml::Table = text.parse()?;
        let name = table
            .get("name")
            .and_then(toml::Value::as_str)
            .unwrap_or("custom")
            .to_string();

        let mut tokens = BTreeMap::new();
        if let Some(section) = table.get("tokens") {
            let section = section.as_table().ok_or_else(|| {
                OverlayError::Message("theme `tokens` must be a table".to_string())
            })?;
            for (key, value) in section {
                let value = value.as_str().ok_or_else(|| OverlayError::InvalidStyleToken {
                    token: key.clone(),
                    value: value.to_string(),
                })?;
                tokens.insert(key.clone(), value.to_string());
            }
        }

        Ok(Self { name, tokens })
    }

    /// Load a TOML theme file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Built-in theme by name (`dark` or `light`)
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Built-in dark theme
    pub fn dark() -> Self {
        Self::from_pairs(
            "dark",
            [
                ("delimiter-color", "#6c7086"),
                ("delimiter-weight", "bold"),
                ("block-background-color", "#1e1e2e"),
                ("keyword-color", "#cba6f7"),
                ("keyword-weight", "bold"),
                ("identifier-color", "#f9e2af"),
                ("yaml-key-color", "#89b4fa"),
                ("yaml-string-color", "#a6e3a1"),
                ("yaml-number-color", "#fab387"),
                ("yaml-boolean-color", "#f38ba8"),
                ("yaml-boolean-style", "italic"),
            ],
        )
    }

    /// Built-in light theme
    pub fn light() -> Self {
        Self::from_pairs(
            "light",
            [
                ("delimiter-color", "#8c8fa1"),
                ("delimiter-weight", "bold"),
                ("block-background-color", "#e6e9ef"),
                ("keyword-color", "#8839ef"),
                ("keyword-weight", "bold"),
                ("identifier-color", "#df8e1d"),
                ("yaml-key-color", "#1e66f5"),
                ("yaml-string-color", "#40a02b"),
                ("yaml-number-color", "#fe640b"),
                ("yaml-boolean-color", "#d20f39"),
                ("yaml-boolean-style", "italic"),
            ],
        )
    }

    /// Theme name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    /// Set or replace a token
    pub fn set(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.tokens.insert(token.into(), value.into());
    }

    /// Remove a token
    pub fn remove(&mut self, token: &str) -> Option<String> {
        self.tokens.remove(token)
    }
}

/// Category → style mapping for one theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleResolver {
    theme: String,
    styles: BTreeMap<Category, Style>,
}

impl StyleResolver {
    /// Read every category's tokens from the snapshot
    ///
    /// Fails on the first missing color token or unparseable value.
    pub fn new(snapshot: &ThemeSnapshot) -> Result<Self> {
        let mut styles = BTreeMap::new();
        for category in Category::ALL {
            styles.insert(category, resolve_category(snapshot, category)?);
        }
        tracing::info!(theme = snapshot.name(), "resolved theme styles");
        Ok(Self {
            theme: snapshot.name().to_string(),
            styles,
        })
    }

    /// Name of the theme this resolver was built from
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Style for a category
    pub fn resolve(&self, category: Category) -> Style {
        self.styles.get(&category).copied().unwrap_or_default()
    }
}

fn resolve_category(snapshot: &ThemeSnapshot, category: Category) -> Result<Style> {
    let color_token = format!("{}-color", category.name());
    let value = snapshot
        .get(&color_token)
        .ok_or_else(|| OverlayError::MissingStyleToken {
            token: color_token.clone(),
        })?;
    let color = Color::parse(value).ok_or_else(|| invalid(&color_token, value))?;

    let mut style = if category.is_background() {
        Style::bg(color)
    } else {
        Style::fg(color)
    };

    let weight_token = format!("{}-weight", category.name());
    match snapshot.get(&weight_token).map(str::trim) {
        None | Some("normal") => {}
        Some("bold") => style = style.with_bold(),
        Some(other) => return Err(invalid(&weight_token, other)),
    }

    let style_token = format!("{}-style", category.name());
    match snapshot.get(&style_token).map(str::trim) {
        None | Some("normal") => {}
        Some("italic") => style = style.with_italic(),
        Some("underline") => style = style.with_underline(),
        Some(other) => return Err(invalid(&style_token, other)),
    }

    Ok(style)
}

fn invalid(token: &str, value: &str) -> OverlayError {
    OverlayError::InvalidStyleToken {
        token: token.to_string(),
        value: value.to_string(),
    }
}
