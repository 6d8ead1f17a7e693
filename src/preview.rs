//! Preview rendering
//!
//! `PreviewHost` is the previewer's side of the overlay protocol: it owns
//! the buffer, the active theme and the decorations last submitted, and
//! paints them through the terminal.

use std::ops::Range;

use crossterm::style::Attribute;

use quillmark_overlay::config::Config;
use quillmark_overlay::line::Line;
use quillmark_overlay::syntax::{
    complete, fold_ranges, Category, DecorationDescriptor, OverlayAdapter, OverlayHost, Style,
    ThemeSnapshot,
};
use quillmark_overlay::{Buffer, Result, TextSource};

use crate::terminal::Terminal;

/// Buffer, theme and decorations for the previewer
pub struct PreviewHost {
    pub buffer: Buffer,
    pub theme: ThemeSnapshot,
    pub config: Config,
    /// First line shown on screen
    pub top_line: usize,
    /// Message shown on the status line
    pub message: Option<String>,
    decorations: Vec<DecorationDescriptor>,
}

impl OverlayHost for PreviewHost {
    fn text(&self) -> &dyn TextSource {
        &self.buffer
    }

    fn theme(&self) -> &ThemeSnapshot {
        &self.theme
    }

    fn submit(&mut self, decorations: Vec<DecorationDescriptor>) {
        self.decorations = decorations;
    }
}

impl PreviewHost {
    /// Create a host for a buffer
    pub fn new(buffer: Buffer, theme: ThemeSnapshot, config: Config) -> Self {
        Self {
            buffer,
            theme,
            config,
            top_line: 0,
            message: None,
            decorations: Vec::new(),
        }
    }

    /// Drop every decoration (highlighting switched off)
    pub fn clear_decorations(&mut self) {
        self.decorations.clear();
    }

    /// Lines visible with `text_rows` rows of screen
    pub fn visible_lines(&self, text_rows: usize) -> Range<usize> {
        let end = (self.top_line + text_rows).min(self.buffer.line_count());
        self.top_line.min(end)..end
    }

    /// Scroll by `delta` lines, keeping at least one line on screen
    pub fn scroll(&mut self, delta: isize) {
        let max_top = self.buffer.line_count().saturating_sub(1);
        self.top_line = self.top_line.saturating_add_signed(delta).min(max_top);
    }

    /// Styled runs of text for one line
    ///
    /// Descriptors are layered in submission order, so a block background
    /// stays beneath token colors. The second value is the style used to
    /// fill the rest of the row.
    pub fn styled_runs(&self, line_idx: usize) -> (Vec<(String, Style)>, Style) {
        let Some(line) = self.buffer.get(line_idx) else {
            return (Vec::new(), Style::default());
        };
        let start = self.buffer.line_start(line_idx);
        let end = start + line.len();

        let mut styles = vec![Style::default(); line.len()];
        let mut fill = Style::default();
        for descriptor in &self.decorations {
            let range = &descriptor.range;
            if range.start > end || range.end < start {
                continue;
            }
            if descriptor.class == Category::BlockBackground.class() && range.start == start {
                fill = fill.patch(descriptor.style);
            }
            let from = range.start.max(start) - start;
            let to = range.end.min(end) - start;
            for style in styles.iter_mut().take(to).skip(from) {
                *style = style.patch(descriptor.style);
            }
        }

        (group_runs(line, &styles, self.config.tab_width), fill)
    }

    /// Paint the visible lines and the status line
    pub fn render(&self, terminal: &mut Terminal, highlighting: bool) -> Result<()> {
        let cols = terminal.cols() as usize;
        let text_rows = terminal.rows().saturating_sub(1) as usize;
        let gutter = if self.config.show_line_numbers {
            self.buffer.line_count().to_string().len() + 1
        } else {
            0
        };

        for row in 0..text_rows {
            terminal.move_cursor(row as u16, 0)?;
            let line_idx = self.top_line + row;
            if line_idx >= self.buffer.line_count() {
                terminal.clear_to_eol()?;
                continue;
            }

            if gutter > 0 {
                terminal.set_attribute(Attribute::Dim)?;
                terminal.write_str(&format!("{:>width$} ", line_idx + 1, width = gutter - 1))?;
                terminal.set_attribute(Attribute::NormalIntensity)?;
            }

            let (runs, fill) = self.styled_runs(line_idx);
            let mut used = gutter;
            for (text, style) in runs {
                if used >= cols {
                    break;
                }
                let shown = truncate_to_width(&text, cols - used);
                used += unicode_width::UnicodeWidthStr::width(shown.as_str());
                terminal.apply_style(&style)?;
                terminal.write_str(&shown)?;
                terminal.set_attribute(Attribute::Reset)?;
            }
            terminal.apply_style(&fill)?;
            terminal.clear_to_eol()?;
            terminal.set_attribute(Attribute::Reset)?;
        }

        self.render_status(terminal, text_rows as u16, cols, highlighting)?;
        terminal.flush()
    }

    fn render_status(
        &self,
        terminal: &mut Terminal,
        row: u16,
        cols: usize,
        highlighting: bool,
    ) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        terminal.set_attribute(Attribute::Reverse)?;

        let line_count = self.buffer.line_count();
        let percent = if line_count <= 1 || self.top_line == 0 {
            "Top".to_string()
        } else if self.top_line + 1 >= line_count {
            "Bot".to_string()
        } else {
            format!("{}%", (self.top_line + 1) * 100 / line_count)
        };
        let overlay = if highlighting { self.theme.name() } else { "off" };
        let mut status = format!(
            "-- {} L{} {} [{}] ",
            self.buffer.name(),
            self.top_line + 1,
            percent,
            overlay
        );
        if let Some(ref msg) = self.message {
            status.push_str(msg);
        }

        let shown = truncate_to_width(&status, cols);
        let width = unicode_width::UnicodeWidthStr::width(shown.as_str());
        terminal.write_str(&shown)?;
        terminal.write_str(&" ".repeat(cols.saturating_sub(width)))?;
        terminal.set_attribute(Attribute::NoReverse)?;
        Ok(())
    }
}

/// Merge per-byte styles into runs, expanding tabs
fn group_runs(line: &Line, styles: &[Style], tab_width: usize) -> Vec<(String, Style)> {
    let mut runs: Vec<(String, Style)> = Vec::new();
    let mut column = 0;
    for (byte, ch) in line.text().char_indices() {
        let style = styles.get(byte).copied().unwrap_or_default();
        let piece = if ch == '\t' {
            let spaces = tab_width - column % tab_width;
            " ".repeat(spaces)
        } else {
            ch.to_string()
        };
        column += unicode_width::UnicodeWidthStr::width(piece.as_str());
        match runs.last_mut() {
            Some((text, last)) if *last == style => text.push_str(&piece),
            _ => runs.push((piece, style)),
        }
    }
    runs
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}

/// Plain-text report of every line with its decorations and folds
pub fn render_dump(buffer: &Buffer, theme: &ThemeSnapshot) -> Result<String> {
    let adapter = OverlayAdapter::new(theme, 0..buffer.line_count())?;
    let decorations = adapter.decorate(buffer).unwrap_or_default();

    let mut out = String::new();
    for (idx, line) in buffer.lines().iter().enumerate() {
        let start = buffer.line_start(idx);
        let end = start + line.len();
        out.push_str(&format!("{:>4} | {}\n", idx + 1, line.text()));
        for d in decorations
            .iter()
            .filter(|d| d.range.start >= start && d.range.end <= end)
        {
            let fragment = line.safe_slice(d.range.start - start, d.range.end - start);
            out.push_str(&format!(
                "     |   {}..{} {} {:?}\n",
                d.range.start, d.range.end, d.class, fragment
            ));
        }
    }

    for fold in fold_ranges(buffer) {
        out.push_str(&format!(
            "fold {}..={} {}\n",
            fold.start_line + 1,
            fold.end_line + 1,
            fold.collapsed_text
        ));
    }
    Ok(out)
}

/// Plain-text list of completions at a 1-based line and 0-based byte column
pub fn render_completions(buffer: &Buffer, line: usize, column: usize) -> String {
    complete(buffer, line.saturating_sub(1), column)
        .into_iter()
        .map(|item| {
            format!(
                "{:?} {} {}\n",
                item.kind,
                item.label,
                item.detail.unwrap_or_default()
            )
        })
        .collect()
}
