//! Completion inside metadata blocks
//!
//! Suggests the reserved keywords at the start of a block line, and after
//! `SCOPE:` / `QUILL:` suggests identifiers already declared elsewhere in
//! the document.

use std::collections::BTreeSet;

use super::detector::{
    find_keyword_declarations, find_metadata_blocks, find_metadata_blocks_in, unclosed_opener,
};
use super::patterns::KEYWORDS;
use crate::buffer::TextSource;

/// Kind of completion item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Identifier,
}

/// A completion suggestion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text shown in the list
    pub label: String,
    /// The kind of completion
    pub kind: CompletionKind,
    /// Detail text (shown after label)
    pub detail: Option<String>,
    /// Text to insert in place of the typed prefix (if different from label)
    pub insert_text: Option<String>,
}

impl CompletionItem {
    /// Create a new completion item
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            insert_text: None,
        }
    }

    /// Set the detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the insert text
    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }
}

/// Completions for the cursor at byte `column` of `line`
///
/// Returns nothing outside metadata blocks, and nothing when the column
/// does not sit on a character boundary.
pub fn complete(source: &dyn TextSource, line: usize, column: usize) -> Vec<CompletionItem> {
    let Some(text) = source.line(line) else {
        return Vec::new();
    };
    if column > text.len() || !text.is_char_boundary(column) {
        return Vec::new();
    }
    if !in_block_region(source, line) {
        return Vec::new();
    }

    let prefix = &text[..column];

    if let Some((keyword, partial)) = split_declaration(prefix) {
        return identifier_items(source, line, keyword, partial);
    }

    KEYWORDS
        .iter()
        .filter(|keyword| keyword.starts_with(prefix))
        .map(|keyword| {
            CompletionItem::new(*keyword, CompletionKind::Keyword)
                .with_detail("declaration")
                .with_insert_text(format!("{keyword}: "))
        })
        .collect()
}

/// Whether `line` is an interior line of a block, or follows an opener
/// that has not been closed yet
fn in_block_region(source: &dyn TextSource, line: usize) -> bool {
    let in_closed = find_metadata_blocks_in(source, line..line + 1)
        .iter()
        .any(|block| block.interior().contains(&line));
    in_closed || unclosed_opener(source).is_some_and(|open| line > open)
}

/// Split `KEYWORD: partial` into the keyword and the partial identifier
fn split_declaration(prefix: &str) -> Option<(&'static str, &str)> {
    let (head, rest) = prefix.split_once(':')?;
    let keyword = KEYWORDS.iter().copied().find(|k| *k == head)?;
    let partial = rest.trim_start();
    partial
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then_some((keyword, partial))
}

fn identifier_items(
    source: &dyn TextSource,
    line: usize,
    keyword: &str,
    partial: &str,
) -> Vec<CompletionItem> {
    let identifiers: BTreeSet<String> = find_metadata_blocks(source)
        .iter()
        .flat_map(|block| find_keyword_declarations(block, &block.lines(), source))
        .filter(|decl| decl.line != line && decl.keyword == keyword)
        .map(|decl| decl.identifier)
        .filter(|identifier| identifier.starts_with(partial))
        .collect();

    identifiers
        .into_iter()
        .map(|identifier| {
            CompletionItem::new(identifier, CompletionKind::Identifier).with_detail(keyword)
        })
        .collect()
}
