//! Decoration categories
//!
//! The abstract kinds of styled range the builder produces. Each category
//! names the theme tokens it is styled from and the class name hosts see.

/// Semantic decoration categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// `---` line opening or closing a metadata block
    Delimiter,
    /// Region styling behind every line of a metadata block
    BlockBackground,
    /// `SCOPE` / `QUILL` keyword
    Keyword,
    /// Identifier following a keyword
    Identifier,
    /// Key of a key-value pair
    YamlKey,
    /// String value
    YamlValueString,
    /// Numeric value
    YamlValueNumber,
    /// `true` / `false`
    YamlValueBoolean,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 8] = [
        Category::Delimiter,
        Category::BlockBackground,
        Category::Keyword,
        Category::Identifier,
        Category::YamlKey,
        Category::YamlValueString,
        Category::YamlValueNumber,
        Category::YamlValueBoolean,
    ];

    /// Token name prefix used in theme snapshots
    pub fn name(&self) -> &'static str {
        match self {
            Category::Delimiter => "delimiter",
            Category::BlockBackground => "block-background",
            Category::Keyword => "keyword",
            Category::Identifier => "identifier",
            Category::YamlKey => "yaml-key",
            Category::YamlValueString => "yaml-string",
            Category::YamlValueNumber => "yaml-number",
            Category::YamlValueBoolean => "yaml-boolean",
        }
    }

    /// Parse a category from its token name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// CSS-like class name handed to hosts
    pub fn class(&self) -> &'static str {
        match self {
            Category::Delimiter => "qm-delimiter",
            Category::BlockBackground => "qm-block",
            Category::Keyword => "qm-keyword",
            Category::Identifier => "qm-identifier",
            Category::YamlKey => "qm-yaml-key",
            Category::YamlValueString => "qm-yaml-string",
            Category::YamlValueNumber => "qm-yaml-number",
            Category::YamlValueBoolean => "qm-yaml-boolean",
        }
    }

    /// Region categories paint beneath token categories
    pub fn is_background(&self) -> bool {
        matches!(self, Category::BlockBackground)
    }
}
