//! Pattern detection over a line-addressable buffer
//!
//! Pure functions that classify lines and pull lexical tokens out of
//! metadata blocks. Nothing here fails: input that does not fit the
//! grammar classifies as plain text.
//!
//! Classifying a line reads at most the line itself and its immediate
//! neighbours. Only the pairing of delimiters into blocks needs to look
//! further, and that scan compares trimmed text without running any regex.

use std::ops::Range;

use super::patterns::{is_delimiter_candidate, Patterns};
use crate::buffer::TextSource;
use crate::line::is_blank;

/// Role of a `---` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterRole {
    /// Opens or closes a metadata block
    MetadataDelimiter,
    /// Horizontal rule in body text (blank lines on both sides)
    ThematicBreak,
    /// Not a `---` line at all
    NotDelimiter,
}

/// A metadata block bounded by its two delimiter lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataBlock {
    /// Line index of the opening delimiter
    pub open: usize,
    /// Line index of the closing delimiter
    pub close: usize,
}

impl MetadataBlock {
    /// Lines covered by the block, delimiters included
    pub fn lines(&self) -> Range<usize> {
        self.open..self.close + 1
    }

    /// Lines between the delimiters
    pub fn interior(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    /// Whether the block shares at least one line with `lines`
    pub fn intersects(&self, lines: &Range<usize>) -> bool {
        !lines.is_empty() && self.open < lines.end && lines.start <= self.close
    }
}

/// Type of a key-value pair's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

/// `SCOPE: name` or `QUILL: name` inside a metadata block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordDeclaration {
    pub line: usize,
    pub keyword: String,
    pub identifier: String,
    /// Byte range of the keyword within the line
    pub keyword_range: Range<usize>,
    /// Byte range of the identifier within the line
    pub identifier_range: Range<usize>,
}

/// `key: value` inside a metadata block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub line: usize,
    pub key: String,
    pub raw_value: String,
    pub value_type: ValueType,
    /// Byte range of the key within the line
    pub key_range: Range<usize>,
    /// Byte range of the value within the line (empty if there is none)
    pub value_range: Range<usize>,
}

/// Classification of a line inside a metadata block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Keyword(KeywordDeclaration),
    KeyValue(KeyValuePair),
    PlainText,
}

/// Classify a line as metadata delimiter, thematic break or neither
///
/// A `---` line is a thematic break only when there is a blank line
/// directly above it and a blank line directly below it. A missing
/// neighbour (first or last line of the buffer) does not count as blank,
/// so a `---` at the very top always opens a block.
pub fn classify_delimiter_line(idx: usize, source: &dyn TextSource) -> DelimiterRole {
    let Some(text) = source.line(idx) else {
        return DelimiterRole::NotDelimiter;
    };
    if !is_delimiter_candidate(text) {
        return DelimiterRole::NotDelimiter;
    }

    let blank_above = idx
        .checked_sub(1)
        .and_then(|prev| source.line(prev))
        .is_some_and(is_blank);
    let blank_below = idx
        .checked_add(1)
        .and_then(|next| source.line(next))
        .is_some_and(is_blank);

    if blank_above && blank_below {
        DelimiterRole::ThematicBreak
    } else {
        DelimiterRole::MetadataDelimiter
    }
}

/// Find every closed metadata block in the buffer
pub fn find_metadata_blocks(source: &dyn TextSource) -> Vec<MetadataBlock> {
    DelimiterIndex::scan(source).blocks
}

/// Find the metadata blocks that intersect `lines`
///
/// Returns exactly the blocks `find_metadata_blocks` would return that
/// share a line with the window. Delimiters pair top to bottom: a line
/// used as a closer never opens another block, and a trailing opener with
/// no partner yields nothing.
pub fn find_metadata_blocks_in(source: &dyn TextSource, lines: Range<usize>) -> Vec<MetadataBlock> {
    let count = source.line_count();
    let window_end = lines.end.min(count);
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;

    for idx in 0..count {
        if idx >= window_end && open.is_none() {
            break;
        }
        if classify_delimiter_line(idx, source) != DelimiterRole::MetadataDelimiter {
            continue;
        }
        match open.take() {
            None => open = Some(idx),
            Some(start) => {
                let block = MetadataBlock {
                    open: start,
                    close: idx,
                };
                if block.intersects(&lines) {
                    blocks.push(block);
                }
            }
        }
    }

    blocks
}

/// The paired metadata blocks of a whole buffer
///
/// Building it reads every line once. After that, finding the blocks of a
/// window is a binary search, independent of where the window sits. The
/// index describes the buffer it was scanned from; rebuild it after every
/// edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimiterIndex {
    blocks: Vec<MetadataBlock>,
    unclosed: Option<usize>,
    line_count: usize,
}

impl DelimiterIndex {
    /// Scan every line of `source` for metadata delimiters
    pub fn scan(source: &dyn TextSource) -> Self {
        let line_count = source.line_count();
        let mut blocks = Vec::new();
        let mut open = None;
        for idx in 0..line_count {
            if classify_delimiter_line(idx, source) != DelimiterRole::MetadataDelimiter {
                continue;
            }
            match open.take() {
                None => open = Some(idx),
                Some(start) => blocks.push(MetadataBlock {
                    open: start,
                    close: idx,
                }),
            }
        }
        Self {
            blocks,
            unclosed: open,
            line_count,
        }
    }

    /// Every closed block, top to bottom
    pub fn blocks(&self) -> &[MetadataBlock] {
        &self.blocks
    }

    /// Line count of the buffer the index was scanned from
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Closed blocks sharing a line with `lines`; same result as
    /// `find_metadata_blocks_in` on the scanned buffer
    pub fn blocks_in(&self, lines: &Range<usize>) -> Vec<MetadataBlock> {
        if lines.is_empty() {
            return Vec::new();
        }
        let first = self.blocks.partition_point(|block| block.close < lines.start);
        self.blocks[first..]
            .iter()
            .take_while(|block| block.open < lines.end)
            .copied()
            .collect()
    }

    /// The trailing opener with no closer, if any
    pub fn unclosed_opener(&self) -> Option<usize> {
        self.unclosed
    }
}

/// Line index of a trailing opener that never found its closer, if any
pub fn unclosed_opener(source: &dyn TextSource) -> Option<usize> {
    DelimiterIndex::scan(source).unclosed
}

/// Classify a single line known to sit inside a metadata block
///
/// The keyword form is tried first; a line that matches it is never also
/// reported as a key-value pair.
pub fn classify_block_line(idx: usize, text: &str) -> LineClass {
    let patterns = Patterns::get();

    if let Some(m) = patterns.keyword(text) {
        return LineClass::Keyword(KeywordDeclaration {
            line: idx,
            keyword: text[m.keyword.clone()].to_string(),
            identifier: text[m.identifier.clone()].to_string(),
            keyword_range: m.keyword,
            identifier_range: m.identifier,
        });
    }

    if let Some(m) = patterns.key_value(text) {
        let raw_value = text[m.value.clone()].to_string();
        return LineClass::KeyValue(KeyValuePair {
            line: idx,
            key: text[m.key.clone()].to_string(),
            value_type: value_type(&raw_value),
            raw_value,
            key_range: m.key,
            value_range: m.value,
        });
    }

    LineClass::PlainText
}

/// Classify every interior line of `block` that falls inside `lines`
pub fn classify_block_lines(
    block: &MetadataBlock,
    lines: &Range<usize>,
    source: &dyn TextSource,
) -> Vec<LineClass> {
    let interior = block.interior();
    let start = interior.start.max(lines.start);
    let end = interior.end.min(lines.end);

    (start..end)
        .filter_map(|idx| source.line(idx).map(|text| classify_block_line(idx, text)))
        .collect()
}

/// Keyword declarations in `block`, restricted to `lines`
pub fn find_keyword_declarations(
    block: &MetadataBlock,
    lines: &Range<usize>,
    source: &dyn TextSource,
) -> Vec<KeywordDeclaration> {
    classify_block_lines(block, lines, source)
        .into_iter()
        .filter_map(|class| match class {
            LineClass::Keyword(decl) => Some(decl),
            _ => None,
        })
        .collect()
}

/// Key-value pairs in `block`, restricted to `lines`
pub fn find_key_value_pairs(
    block: &MetadataBlock,
    lines: &Range<usize>,
    source: &dyn TextSource,
) -> Vec<KeyValuePair> {
    classify_block_lines(block, lines, source)
        .into_iter()
        .filter_map(|class| match class {
            LineClass::KeyValue(pair) => Some(pair),
            _ => None,
        })
        .collect()
}

/// Type a raw value: boolean first, then number, otherwise string
pub fn value_type(raw: &str) -> ValueType {
    let patterns = Patterns::get();
    if patterns.is_boolean(raw) {
        ValueType::Boolean
    } else if patterns.is_number(raw) {
        ValueType::Number
    } else {
        ValueType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_delimiter_at_edges_is_never_a_break() {
        let source = doc(&["---", "", "text", "", "---"]);
        assert_eq!(classify_delimiter_line(0, &source), DelimiterRole::MetadataDelimiter);
        assert_eq!(classify_delimiter_line(4, &source), DelimiterRole::MetadataDelimiter);

        let source = doc(&["---", ""]);
        assert_eq!(classify_delimiter_line(0, &source), DelimiterRole::MetadataDelimiter);
        let source = doc(&["", "---"]);
        assert_eq!(classify_delimiter_line(1, &source), DelimiterRole::MetadataDelimiter);
        let source = doc(&["---"]);
        assert_eq!(classify_delimiter_line(0, &source), DelimiterRole::MetadataDelimiter);
    }

    #[test]
    fn test_thematic_break_needs_blank_on_both_sides() {
        let source = doc(&["Text", "", "---", "", "More text"]);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::ThematicBreak);

        let source = doc(&["Text", "above", "---", "", "More text"]);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::MetadataDelimiter);

        let source = doc(&["Text", "", "---", "below", "More text"]);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::MetadataDelimiter);

        // whitespace-only neighbours count as blank
        let source = doc(&["Text", "  ", " --- ", "\t", "More"]);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::ThematicBreak);
    }

    #[test]
    fn test_non_delimiters() {
        let source = doc(&["----", "- - -", "text"]);
        for idx in 0..3 {
            assert_eq!(classify_delimiter_line(idx, &source), DelimiterRole::NotDelimiter);
        }
        assert_eq!(classify_delimiter_line(99, &source), DelimiterRole::NotDelimiter);
    }

    #[test]
    fn test_block_pairing() {
        let source = doc(&["intro", "---", "a: 1", "b: 2", "---", "body"]);
        let blocks = find_metadata_blocks(&source);
        assert_eq!(blocks, vec![MetadataBlock { open: 1, close: 4 }]);
        assert_eq!(blocks[0].lines(), 1..5);
        assert_eq!(blocks[0].interior(), 2..4);
    }

    #[test]
    fn test_unclosed_block_yields_nothing() {
        let source = doc(&["body", "---", "a: 1", "b: 2"]);
        assert!(find_metadata_blocks(&source).is_empty());
        assert_eq!(unclosed_opener(&source), Some(1));
    }

    #[test]
    fn test_closer_does_not_reopen() {
        let source = doc(&["---", "a: 1", "---", "---", "b: 2", "---", "---"]);
        let blocks = find_metadata_blocks(&source);
        assert_eq!(
            blocks,
            vec![
                MetadataBlock { open: 0, close: 2 },
                MetadataBlock { open: 3, close: 5 },
            ]
        );
        assert_eq!(unclosed_opener(&source), Some(6));
    }

    #[test]
    fn test_thematic_breaks_do_not_pair() {
        let source = doc(&["---", "a: 1", "", "---", "", "b: 2", "---"]);
        assert_eq!(classify_delimiter_line(3, &source), DelimiterRole::ThematicBreak);
        assert_eq!(find_metadata_blocks(&source), vec![MetadataBlock { open: 0, close: 6 }]);
    }

    #[test]
    fn test_windowed_blocks_match_full_scan() {
        let source = doc(&[
            "---", "a: 1", "---", "text", "---", "b: 2", "c: 3", "---", "tail", "---", "d: 4",
        ]);
        let all = find_metadata_blocks(&source);
        let index = DelimiterIndex::scan(&source);
        for start in 0..source.len() {
            for end in start..=source.len() + 2 {
                let window = start..end;
                let expected: Vec<_> = all.iter().copied().filter(|b| b.intersects(&window)).collect();
                assert_eq!(index.blocks_in(&window), expected, "window {start}..{end}");
                assert_eq!(find_metadata_blocks_in(&source, window), expected);
            }
        }
    }

    #[test]
    fn test_delimiter_index() {
        let source = doc(&["---", "a: 1", "---", "", "---", "", "body", "---", "b: 2"]);
        let index = DelimiterIndex::scan(&source);
        assert_eq!(index.line_count(), 9);
        // line 4 is a thematic break and pairs with nothing
        assert_eq!(index.blocks(), &[MetadataBlock { open: 0, close: 2 }]);
        assert_eq!(index.unclosed_opener(), Some(7));
        assert!(index.blocks_in(&(3..9)).is_empty());
        assert!(index.blocks_in(&(1..1)).is_empty());
        assert_eq!(index.blocks_in(&(2..3)), vec![MetadataBlock { open: 0, close: 2 }]);
    }

    #[test]
    fn test_scenario_front_matter() {
        let source = doc(&["---", "scope: intro", "---", "Hello"]);
        assert_eq!(classify_delimiter_line(0, &source), DelimiterRole::MetadataDelimiter);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::MetadataDelimiter);

        let blocks = find_metadata_blocks(&source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines(), 0..3);

        let pairs = find_key_value_pairs(&blocks[0], &(0..4), &source);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].line, 1);
        assert_eq!(pairs[0].key, "scope");
        assert_eq!(pairs[0].raw_value, "intro");
        assert_eq!(pairs[0].value_type, ValueType::String);
        assert!(find_keyword_declarations(&blocks[0], &(0..4), &source).is_empty());
    }

    #[test]
    fn test_scenario_thematic_break() {
        let source = doc(&["Text", "", "---", "", "More text"]);
        assert_eq!(classify_delimiter_line(2, &source), DelimiterRole::ThematicBreak);
        assert!(find_metadata_blocks(&source).is_empty());
    }

    #[test]
    fn test_scenario_keyword_and_number() {
        let source = doc(&["---", "QUILL: report_template", "key: 3.5", "---"]);
        let blocks = find_metadata_blocks(&source);
        assert_eq!(blocks.len(), 1);

        let decls = find_keyword_declarations(&blocks[0], &(0..4), &source);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].line, 1);
        assert_eq!(decls[0].keyword, "QUILL");
        assert_eq!(decls[0].identifier, "report_template");

        let pairs = find_key_value_pairs(&blocks[0], &(0..4), &source);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].line, 2);
        assert_eq!((pairs[0].key.as_str(), pairs[0].raw_value.as_str()), ("key", "3.5"));
        assert_eq!(pairs[0].value_type, ValueType::Number);
    }

    #[test]
    fn test_extraction_never_leaves_the_block() {
        let source = doc(&["title: outside", "---", "inside: yes", "---", "after: 1"]);
        let blocks = find_metadata_blocks(&source);
        let pairs = find_key_value_pairs(&blocks[0], &(0..5), &source);
        assert_eq!(pairs.iter().map(|p| p.line).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_extraction_respects_window() {
        let source = doc(&["---", "a: 1", "b: 2", "c: 3", "---"]);
        let blocks = find_metadata_blocks(&source);
        let pairs = find_key_value_pairs(&blocks[0], &(2..3), &source);
        assert_eq!(pairs.iter().map(|p| p.key.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_keyword_and_key_value_are_exclusive() {
        assert!(matches!(classify_block_line(0, "SCOPE: intro"), LineClass::Keyword(_)));
        assert!(matches!(classify_block_line(0, "scope: intro"), LineClass::KeyValue(_)));
        // a keyword with a malformed identifier falls back to a plain pair
        match classify_block_line(0, "QUILL: not valid!") {
            LineClass::KeyValue(pair) => assert_eq!(pair.raw_value, "not valid!"),
            other => panic!("expected key-value, got {other:?}"),
        }
        assert_eq!(classify_block_line(0, "just some words"), LineClass::PlainText);
        assert_eq!(classify_block_line(0, ""), LineClass::PlainText);
    }

    #[rstest]
    #[case("flag: true", ValueType::Boolean)]
    #[case("flag: false", ValueType::Boolean)]
    #[case("count: 42", ValueType::Number)]
    #[case("count: -7", ValueType::Number)]
    #[case("count: 01", ValueType::Number)]
    #[case("ratio: 3.5", ValueType::Number)]
    #[case("count: 42abc", ValueType::String)]
    #[case("count: ٤٢", ValueType::String)]
    #[case("count: １２", ValueType::String)]
    #[case("flag: True", ValueType::String)]
    #[case("name: \"quoted\"", ValueType::String)]
    #[case("empty:", ValueType::String)]
    fn test_value_type_tie_break(#[case] line: &str, #[case] expected: ValueType) {
        match classify_block_line(0, line) {
            LineClass::KeyValue(pair) => assert_eq!(pair.value_type, expected),
            other => panic!("expected key-value for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_unicode_values_keep_byte_ranges() {
        match classify_block_line(3, "title: café ☕") {
            LineClass::KeyValue(pair) => {
                assert_eq!(pair.line, 3);
                assert_eq!(pair.value_range, 7..16);
                assert_eq!(pair.raw_value, "café ☕");
            }
            other => panic!("expected key-value, got {other:?}"),
        }
    }
}
