//! Lexical patterns for metadata block lines
//!
//! Regexes are compiled once and shared. Every matcher works on a single
//! line and reports byte ranges relative to that line.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Trimmed content of a block delimiter line
pub const DELIMITER: &str = "---";

/// Reserved keywords allowed in a keyword declaration
pub const KEYWORDS: [&str; 2] = ["SCOPE", "QUILL"];

/// A named, compiled line pattern
pub struct PatternRule {
    /// Name for debugging
    pub name: &'static str,
    /// Compiled regex pattern
    pub pattern: Regex,
}

impl PatternRule {
    /// Compile a rule; a bad pattern is logged and yields `None`
    pub fn new(name: &'static str, pattern: &str) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(regex) => Some(Self {
                name,
                pattern: regex,
            }),
            Err(err) => {
                tracing::warn!(rule = name, error = %err, "pattern failed to compile");
                None
            }
        }
    }

    /// Capture groups for the whole line, if it matches
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(text)
    }

    /// Whether the text matches
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Byte ranges of a `KEYWORD: identifier` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub keyword: Range<usize>,
    pub identifier: Range<usize>,
}

/// Byte ranges of a `key: value` line; `value` is empty when nothing
/// follows the colon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueMatch {
    pub key: Range<usize>,
    pub value: Range<usize>,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(Patterns::compile);

/// The compiled pattern set
///
/// A rule that failed to compile is `None` and simply never matches, so
/// a bad pattern degrades to plain text instead of failing.
pub struct Patterns {
    keyword: Option<PatternRule>,
    key_value: Option<PatternRule>,
    boolean: Option<PatternRule>,
    number: Option<PatternRule>,
}

impl Patterns {
    fn compile() -> Self {
        let keyword = format!(
            r"^({}):\s*([A-Za-z_][A-Za-z0-9_]*)\s*$",
            KEYWORDS.join("|")
        );
        let patterns = Self {
            keyword: PatternRule::new("keyword", &keyword),
            key_value: PatternRule::new(
                "key_value",
                r"^\s*([A-Za-z_][A-Za-z0-9_-]*)\s*:(?:\s+(.*?))?\s*$",
            ),
            boolean: PatternRule::new("boolean", r"^(?:true|false)$"),
            // ASCII digits only; `\d` would also accept other scripts' digits
            number: PatternRule::new("number", r"^-?[0-9]+(?:\.[0-9]+)?$"),
        };
        let compiled: Vec<_> = patterns.rules().map(|rule| rule.name).collect();
        tracing::trace!(?compiled, "compiled metadata patterns");
        patterns
    }

    /// Rules that compiled, in match order
    fn rules(&self) -> impl Iterator<Item = &PatternRule> {
        [&self.keyword, &self.key_value, &self.boolean, &self.number]
            .into_iter()
            .flatten()
    }

    /// Shared instance
    pub fn get() -> &'static Patterns {
        &PATTERNS
    }

    /// Match a keyword declaration line
    pub fn keyword(&self, text: &str) -> Option<KeywordMatch> {
        let caps = self.keyword.as_ref()?.captures(text)?;
        let keyword = caps.get(1)?;
        let identifier = caps.get(2)?;
        Some(KeywordMatch {
            keyword: keyword.range(),
            identifier: identifier.range(),
        })
    }

    /// Match a key-value line
    pub fn key_value(&self, text: &str) -> Option<KeyValueMatch> {
        let caps = self.key_value.as_ref()?.captures(text)?;
        let key = caps.get(1)?.range();
        let value = match caps.get(2) {
            Some(m) => m.range(),
            None => key.end..key.end,
        };
        Some(KeyValueMatch { key, value })
    }

    /// Whether a raw value is a boolean literal
    pub fn is_boolean(&self, value: &str) -> bool {
        self.boolean.as_ref().is_some_and(|rule| rule.is_match(value))
    }

    /// Whether a raw value is a numeric literal
    pub fn is_number(&self, value: &str) -> bool {
        self.number.as_ref().is_some_and(|rule| rule.is_match(value))
    }
}

/// Whether the line is a delimiter candidate (before disambiguation)
pub fn is_delimiter_candidate(text: &str) -> bool {
    text.trim() == DELIMITER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        let patterns = Patterns::compile();
        for rule in [
            &patterns.keyword,
            &patterns.key_value,
            &patterns.boolean,
            &patterns.number,
        ] {
            assert!(rule.is_some());
        }
        let names: Vec<_> = patterns.rules().map(|rule| rule.name).collect();
        assert_eq!(names, vec!["keyword", "key_value", "boolean", "number"]);
    }

    #[test]
    fn test_bad_pattern_yields_none() {
        assert!(PatternRule::new("broken", r"(unclosed").is_none());
    }

    #[test]
    fn test_numbers_are_ascii_only() {
        let patterns = Patterns::get();
        assert!(patterns.is_number("42"));
        assert!(patterns.is_number("-0.5"));
        assert!(!patterns.is_number("٤٢"));
        assert!(!patterns.is_number("１２"));
        assert!(!patterns.is_number("1.٥"));
    }

    #[test]
    fn test_keyword_match() {
        let patterns = Patterns::get();
        let m = patterns.keyword("QUILL: report_template").unwrap();
        assert_eq!(m.keyword, 0..5);
        assert_eq!(m.identifier, 7..22);

        assert!(patterns.keyword("SCOPE:intro").is_some());
        assert!(patterns.keyword("scope: intro").is_none());
        assert!(patterns.keyword(" SCOPE: intro").is_none());
        assert!(patterns.keyword("QUILL: two words").is_none());
        assert!(patterns.keyword("QUILL:").is_none());
    }

    #[test]
    fn test_key_value_match() {
        let patterns = Patterns::get();
        let line = "  title:   Hello world  ";
        let m = patterns.key_value(line).unwrap();
        assert_eq!(&line[m.key.clone()], "title");
        assert_eq!(&line[m.value.clone()], "Hello world");

        let m = patterns.key_value("empty:").unwrap();
        assert_eq!(m.key, 0..5);
        assert!(m.value.is_empty());

        assert!(patterns.key_value("no separator").is_none());
        assert!(patterns.key_value("# comment: nope").is_none());
        assert!(patterns.key_value("url:http").is_none());
    }

    #[test]
    fn test_delimiter_candidate() {
        assert!(is_delimiter_candidate("---"));
        assert!(is_delimiter_candidate("  ---\t"));
        assert!(!is_delimiter_candidate("----"));
        assert!(!is_delimiter_candidate("- - -"));
        assert!(!is_delimiter_candidate(""));
    }
}
