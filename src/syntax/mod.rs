//! Syntax overlay for QuillMark metadata blocks
//!
//! Data flows one way: a `TextSource` goes through the detector, the
//! decoration builder and the style resolver, and the adapter hands the
//! result to the host. Folding and completion sit beside the builder and
//! reuse the detector.

mod adapter;
mod category;
mod completion;
mod decoration;
mod detector;
mod folding;
mod patterns;
mod style;
mod theme;

pub use adapter::{
    DecorationDescriptor, HostEvent, Listener, OverlayAdapter, OverlayHost, SubscriptionId,
    Subscriptions,
};
pub use category::Category;
pub use completion::{complete, CompletionItem, CompletionKind};
pub use decoration::{build_decorations, build_decorations_indexed, Decoration};
pub use detector::{
    classify_block_line, classify_block_lines, classify_delimiter_line, find_key_value_pairs,
    find_keyword_declarations, find_metadata_blocks, find_metadata_blocks_in, unclosed_opener,
    value_type, DelimiterIndex, DelimiterRole, KeyValuePair, KeywordDeclaration, LineClass, MetadataBlock,
    ValueType,
};
pub use folding::{fold_ranges, FoldRange};
pub use patterns::{DELIMITER, KEYWORDS};
pub use style::{Color, Style};
pub use theme::{StyleResolver, ThemeSnapshot};
