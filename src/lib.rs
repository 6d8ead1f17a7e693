//! quillmark-overlay - syntax overlay for documents with metadata blocks
//!
//! Classifies `---` delimited metadata blocks inside prose, extracts their
//! keyword declarations and key-value pairs, and produces styled
//! decorations for the visible part of a host editor's buffer.

pub mod buffer;
pub mod config;
pub mod error;
pub mod line;
pub mod syntax;

pub use buffer::{Buffer, TextSource};
pub use error::{OverlayError, Result};
