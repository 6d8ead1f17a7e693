//! Fold ranges for metadata blocks

use super::detector::{classify_block_lines, find_metadata_blocks, LineClass};
use crate::buffer::TextSource;

/// A foldable line range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRange {
    /// Line that stays visible when folded (the opening delimiter)
    pub start_line: usize,
    /// Last folded line, inclusive (the closing delimiter)
    pub end_line: usize,
    /// Placeholder shown in place of the folded lines
    pub collapsed_text: String,
}

/// One fold per closed metadata block that has content
///
/// Unclosed blocks have no end to fold to and are skipped, as are blocks
/// whose delimiters are adjacent.
pub fn fold_ranges(source: &dyn TextSource) -> Vec<FoldRange> {
    find_metadata_blocks(source)
        .into_iter()
        .filter(|block| !block.interior().is_empty())
        .map(|block| {
            let classes = classify_block_lines(&block, &block.lines(), source);
            FoldRange {
                start_line: block.open,
                end_line: block.close,
                collapsed_text: summarize(&classes),
            }
        })
        .collect()
}

fn summarize(classes: &[LineClass]) -> String {
    let declaration = classes.iter().find_map(|class| match class {
        LineClass::Keyword(decl) => Some(decl),
        _ => None,
    });
    if let Some(decl) = declaration {
        return format!("--- {}: {}", decl.keyword, decl.identifier);
    }

    let keys = classes
        .iter()
        .filter(|class| matches!(class, LineClass::KeyValue(_)))
        .count();
    match keys {
        1 => "--- 1 key".to_string(),
        n => format!("--- {n} keys"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fold_per_block() {
        let source = doc(&[
            "---", "QUILL: memo", "to: all", "---", "", "Body", "---", "a: 1", "b: 2", "---",
        ]);
        let folds = fold_ranges(&source);
        assert_eq!(
            folds,
            vec![
                FoldRange {
                    start_line: 0,
                    end_line: 3,
                    collapsed_text: "--- QUILL: memo".to_string(),
                },
                FoldRange {
                    start_line: 6,
                    end_line: 9,
                    collapsed_text: "--- 2 keys".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_no_fold_for_unclosed_or_empty_blocks() {
        assert!(fold_ranges(&doc(&["---", "a: 1"])).is_empty());
        assert!(fold_ranges(&doc(&["---", "---", "text"])).is_empty());
    }

    #[test]
    fn test_summary_wording() {
        let folds = fold_ranges(&doc(&["---", "only: one", "---"]));
        assert_eq!(folds[0].collapsed_text, "--- 1 key");

        let folds = fold_ranges(&doc(&["---", "free text", "---"]));
        assert_eq!(folds[0].collapsed_text, "--- 0 keys");
    }
}
