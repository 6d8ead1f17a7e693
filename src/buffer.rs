//! Buffer representation - the line-addressable text the overlay reads

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::line::Line;

/// Read-only, line-addressable view of the text being edited
///
/// This is everything the detector needs from a host. Offsets returned by
/// `line_start` count UTF-8 bytes, with one newline between lines.
pub trait TextSource {
    /// Number of lines in the buffer
    fn line_count(&self) -> usize;

    /// Text of a line, without its newline
    fn line(&self, idx: usize) -> Option<&str>;

    /// Byte offset at which a line starts
    ///
    /// The default walks every preceding line; implementors that keep an
    /// offset table should override it.
    fn line_start(&self, idx: usize) -> usize {
        (0..idx.min(self.line_count()))
            .map(|i| self.line(i).map_or(0, str::len) + 1)
            .sum()
    }
}

impl<S: AsRef<str>> TextSource for Vec<S> {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line(&self, idx: usize) -> Option<&str> {
        self.get(idx).map(AsRef::as_ref)
    }
}

/// A document buffer: lines plus the file they came from
#[derive(Debug, Clone)]
pub struct Buffer {
    /// Lines of text
    lines: Vec<Line>,
    /// Byte offset of the start of each line
    starts: Vec<usize>,
    /// Buffer name (file name, or "*scratch*")
    name: String,
    /// Associated file path (None for in-memory buffers)
    filename: Option<PathBuf>,
}

impl Buffer {
    /// Create a buffer from in-memory text
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut buffer = Self {
            lines: split_lines(text),
            starts: Vec::new(),
            name: name.into(),
            filename: None,
        };
        buffer.reindex();
        buffer
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let mut buffer = Self::from_text(name, &content);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Re-read the buffer from its file
    ///
    /// Returns the line range that differs from the previous contents, so
    /// the caller can announce it as a document change.
    pub fn reload(&mut self) -> Result<Range<usize>> {
        let Some(path) = self.filename.clone() else {
            return Ok(0..0);
        };
        let content = std::fs::read_to_string(&path)?;
        let lines = split_lines(&content);
        Ok(self.replace_all(lines))
    }

    /// Replace a range of lines with new ones, returning the affected range
    /// in the updated buffer
    pub fn replace_lines(&mut self, range: Range<usize>, new_lines: Vec<Line>) -> Range<usize> {
        let start = range.start.min(self.lines.len());
        let end = range.end.clamp(start, self.lines.len());
        let inserted = new_lines.len();
        self.lines.splice(start..end, new_lines);
        if self.lines.is_empty() {
            self.lines.push(Line::new());
        }
        self.reindex();
        start..(start + inserted).min(self.lines.len())
    }

    fn replace_all(&mut self, lines: Vec<Line>) -> Range<usize> {
        let first_diff = self
            .lines
            .iter()
            .zip(&lines)
            .take_while(|(old, new)| old == new)
            .count();
        let changed_end = if self.lines.len() == lines.len() {
            let common_suffix = self
                .lines
                .iter()
                .rev()
                .zip(lines.iter().rev())
                .take_while(|(old, new)| old == new)
                .count();
            lines.len().saturating_sub(common_suffix).max(first_diff)
        } else {
            lines.len()
        };
        self.lines = lines;
        self.reindex();
        first_diff..changed_end
    }

    fn reindex(&mut self) {
        self.starts.clear();
        let mut offset = 0;
        for line in &self.lines {
            self.starts.push(offset);
            offset += line.len() + 1;
        }
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Get a line by index
    pub fn get(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Get all lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

impl TextSource for Buffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(Line::text)
    }

    fn line_start(&self, idx: usize) -> usize {
        match self.starts.get(idx) {
            Some(&start) => start,
            None => self
                .lines
                .last()
                .zip(self.starts.last())
                .map_or(0, |(line, start)| start + line.len() + 1),
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::from_text("*scratch*", "")
    }
}

/// Split text into lines, always producing at least one line
fn split_lines(text: &str) -> Vec<Line> {
    let lines: Vec<Line> = text.lines().map(Line::from).collect();
    if lines.is_empty() {
        vec![Line::new()]
    } else {
        lines
    }
}
