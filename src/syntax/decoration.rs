//! Decoration building for a visible window
//!
//! Turns detector output into the ordered list of styled ranges a host
//! paints. Every call builds a fresh list; nothing is cached between calls.

use std::ops::Range;

use super::category::Category;
use super::detector::{
    classify_block_lines, classify_delimiter_line, find_metadata_blocks_in, DelimiterIndex,
    DelimiterRole, LineClass, MetadataBlock, ValueType,
};
use super::patterns::DELIMITER;
use crate::buffer::TextSource;

/// A styled range of buffer text
///
/// `range` is a byte-offset interval into the whole buffer; `line` is the
/// line it lies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub range: Range<usize>,
    pub line: usize,
    pub category: Category,
}

impl Decoration {
    fn new(line: usize, range: Range<usize>, category: Category) -> Self {
        Self {
            range,
            line,
            category,
        }
    }
}

/// Build the decorations for the lines in `visible`
///
/// Block backgrounds come first, in line order, followed by token
/// decorations sorted by position, so a host applying them in order paints
/// backgrounds beneath tokens. Lines outside `visible` never receive a
/// decoration, which keeps the result for a smaller window equal to the
/// matching slice of the result for a larger one.
pub fn build_decorations(visible: Range<usize>, source: &dyn TextSource) -> Vec<Decoration> {
    let window = clamp(visible, source);
    let blocks = find_metadata_blocks_in(source, window.clone());
    build(window, blocks, source)
}

/// `build_decorations` with block pairing taken from a prebuilt index
///
/// Reads only the lines of `visible` and their neighbours, so the cost
/// follows the window size rather than its position. `index` must have
/// been scanned from `source` as it is now.
pub fn build_decorations_indexed(
    visible: Range<usize>,
    source: &dyn TextSource,
    index: &DelimiterIndex,
) -> Vec<Decoration> {
    let window = clamp(visible, source);
    let blocks = index.blocks_in(&window);
    build(window, blocks, source)
}

fn clamp(visible: Range<usize>, source: &dyn TextSource) -> Range<usize> {
    let count = source.line_count();
    visible.start.min(count)..visible.end.min(count)
}

fn build(window: Range<usize>, blocks: Vec<MetadataBlock>, source: &dyn TextSource) -> Vec<Decoration> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut backgrounds = Vec::new();
    let mut tokens = Vec::new();

    for block in blocks {
        let lines = block.lines();
        for idx in lines.start.max(window.start)..lines.end.min(window.end) {
            let start = source.line_start(idx);
            let len = source.line(idx).map_or(0, str::len);
            backgrounds.push(Decoration::new(idx, start..start + len, Category::BlockBackground));
        }

        for class in classify_block_lines(&block, &window, source) {
            push_line_tokens(&class, source, &mut tokens);
        }
    }

    // Unclosed openers keep their delimiter styling, so delimiters are
    // decorated per line rather than per block.
    for idx in window.clone() {
        if classify_delimiter_line(idx, source) != DelimiterRole::MetadataDelimiter {
            continue;
        }
        let Some(text) = source.line(idx) else {
            continue;
        };
        let start = source.line_start(idx) + text.find(DELIMITER).unwrap_or(0);
        tokens.push(Decoration::new(idx, start..start + DELIMITER.len(), Category::Delimiter));
    }

    backgrounds.sort_by_key(|d| (d.range.start, d.range.end));
    tokens.sort_by_key(|d| (d.range.start, d.range.end));

    tracing::debug!(
        window = ?window,
        backgrounds = backgrounds.len(),
        tokens = tokens.len(),
        "built decorations"
    );

    backgrounds.extend(tokens);
    backgrounds
}

fn push_line_tokens(class: &LineClass, source: &dyn TextSource, out: &mut Vec<Decoration>) {
    match class {
        LineClass::Keyword(decl) => {
            let base = source.line_start(decl.line);
            out.push(Decoration::new(
                decl.line,
                shift(&decl.keyword_range, base),
                Category::Keyword,
            ));
            out.push(Decoration::new(
                decl.line,
                shift(&decl.identifier_range, base),
                Category::Identifier,
            ));
        }
        LineClass::KeyValue(pair) => {
            let base = source.line_start(pair.line);
            out.push(Decoration::new(
                pair.line,
                shift(&pair.key_range, base),
                Category::YamlKey,
            ));
            if !pair.value_range.is_empty() {
                let category = match pair.value_type {
                    ValueType::String => Category::YamlValueString,
                    ValueType::Number => Category::YamlValueNumber,
                    ValueType::Boolean => Category::YamlValueBoolean,
                };
                out.push(Decoration::new(pair.line, shift(&pair.value_range, base), category));
            }
        }
        LineClass::PlainText => {}
    }
}

fn shift(range: &Range<usize>, base: usize) -> Range<usize> {
    base + range.start..base + range.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;

    fn buffer(lines: &[&str]) -> Buffer {
        Buffer::from_text("test", &lines.join("\n"))
    }

    fn summary(source: &dyn TextSource, decorations: &[Decoration]) -> Vec<(String, Category)> {
        let text: Vec<&str> = (0..source.line_count()).filter_map(|i| source.line(i)).collect();
        let text = text.join("\n");
        decorations
            .iter()
            .map(|d| (text[d.range.clone()].to_string(), d.category))
            .collect()
    }

    const SAMPLE: &[&str] = &[
        "# Title",
        "",
        "---",
        "QUILL: report_template",
        "draft: true",
        "---",
        "",
        "Some prose.",
        "",
        "---",
        "",
        "More prose.",
        "---",
        "SCOPE: appendix",
        "pages: 12",
        "note:",
        "---",
        "tail",
    ];

    #[test]
    fn test_front_matter_decorations() {
        let source = buffer(&["---", "scope: intro", "---", "Hello"]);
        let decorations = build_decorations(0..4, &source);
        assert_eq!(
            summary(&source, &decorations),
            vec![
                ("---".to_string(), Category::BlockBackground),
                ("scope: intro".to_string(), Category::BlockBackground),
                ("---".to_string(), Category::BlockBackground),
                ("---".to_string(), Category::Delimiter),
                ("scope".to_string(), Category::YamlKey),
                ("intro".to_string(), Category::YamlValueString),
                ("---".to_string(), Category::Delimiter),
            ]
        );
    }

    #[test]
    fn test_backgrounds_precede_tokens() {
        let source = buffer(SAMPLE);
        let decorations = build_decorations(0..SAMPLE.len(), &source);
        let first_token = decorations
            .iter()
            .position(|d| !d.category.is_background())
            .unwrap();
        assert!(decorations[..first_token].iter().all(|d| d.category.is_background()));
        assert!(decorations[first_token..].iter().all(|d| !d.category.is_background()));
    }

    #[test]
    fn test_sample_tokens() {
        let source = buffer(SAMPLE);
        let decorations = build_decorations(0..SAMPLE.len(), &source);
        let tokens: Vec<_> = summary(&source, &decorations)
            .into_iter()
            .filter(|(_, c)| !c.is_background())
            .collect();
        assert_eq!(
            tokens,
            vec![
                ("---".to_string(), Category::Delimiter),
                ("QUILL".to_string(), Category::Keyword),
                ("report_template".to_string(), Category::Identifier),
                ("draft".to_string(), Category::YamlKey),
                ("true".to_string(), Category::YamlValueBoolean),
                ("---".to_string(), Category::Delimiter),
                ("---".to_string(), Category::Delimiter),
                ("SCOPE".to_string(), Category::Keyword),
                ("appendix".to_string(), Category::Identifier),
                ("pages".to_string(), Category::YamlKey),
                ("12".to_string(), Category::YamlValueNumber),
                ("note".to_string(), Category::YamlKey),
                ("---".to_string(), Category::Delimiter),
            ]
        );
        // the thematic break on line 9 is left alone
        assert!(decorations.iter().all(|d| d.line != 9));
    }

    #[test]
    fn test_unclosed_opener_keeps_delimiter_only() {
        let source = buffer(&["text", "---", "a: 1"]);
        let decorations = build_decorations(0..3, &source);
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].category, Category::Delimiter);
        assert_eq!(decorations[0].line, 1);
    }

    #[test]
    fn test_indented_delimiter_range() {
        let source = buffer(&["  ---", "a: 1", "---"]);
        let decorations = build_decorations(0..3, &source);
        let delimiter = decorations
            .iter()
            .find(|d| d.category == Category::Delimiter)
            .unwrap();
        assert_eq!(delimiter.range, 2..5);
    }

    #[test]
    fn test_idempotent() {
        let source = buffer(SAMPLE);
        let first = build_decorations(3..15, &source);
        let second = build_decorations(3..15, &source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_equivalence() {
        let source = buffer(SAMPLE);
        let full = build_decorations(0..SAMPLE.len(), &source);
        for start in 0..SAMPLE.len() {
            for end in start..=SAMPLE.len() {
                let expected: Vec<_> = full
                    .iter()
                    .filter(|d| (start..end).contains(&d.line))
                    .cloned()
                    .collect();
                assert_eq!(
                    build_decorations(start..end, &source),
                    expected,
                    "window {start}..{end}"
                );
            }
        }
    }

    #[test]
    fn test_indexed_build_matches_scan() {
        let source = buffer(SAMPLE);
        let index = DelimiterIndex::scan(&source);
        for start in 0..SAMPLE.len() {
            for end in start..=SAMPLE.len() + 3 {
                assert_eq!(
                    build_decorations_indexed(start..end, &source, &index),
                    build_decorations(start..end, &source),
                    "window {start}..{end}"
                );
            }
        }
    }

    #[test]
    fn test_window_clamped_to_buffer() {
        let source = buffer(&["---", "a: 1", "---"]);
        assert_eq!(build_decorations(0..100, &source), build_decorations(0..3, &source));
        assert!(build_decorations(50..100, &source).is_empty());
    }

    #[test]
    fn test_decorations_are_fresh_after_edit() {
        let mut source = buffer(&["---", "a: 1", "---"]);
        let before = build_decorations(0..3, &source);
        source.replace_lines(1..2, vec!["a: yes".into()]);
        let after = build_decorations(0..3, &source);
        assert_ne!(before, after);
        assert!(after
            .iter()
            .any(|d| d.category == Category::YamlValueString && d.line == 1));
    }
}
