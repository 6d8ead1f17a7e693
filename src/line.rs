//! A single buffer line and the blankness test delimiters depend on

use std::fmt;

/// One line of document text, stored without its newline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line(String);

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Length in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the line holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        is_blank(&self.0)
    }

    /// Slice by byte offsets, widening to the enclosing char boundaries
    ///
    /// Out-of-range offsets are clamped; an empty or inverted range gives "".
    pub fn safe_slice(&self, start: usize, end: usize) -> &str {
        let text = self.0.as_str();
        let end = end.min(text.len());
        if start >= end {
            return "";
        }
        let start = (0..=start).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        let end = (end..=text.len())
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(text.len());
        &text[start..end]
    }
}

/// Whether `text` is empty after trimming whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Self(s)
    }
}
