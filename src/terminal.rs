//! Raw-mode screen for the previewer, on top of crossterm

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{self as term_style, Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use quillmark_overlay::syntax::{Color, Style};
use quillmark_overlay::Result;

/// Input the previewer reacts to
pub enum Input {
    Key(KeyEvent),
    Resize,
}

/// Alternate screen in raw mode; restored on drop
///
/// Drawing commands are queued into a buffer and only reach the terminal
/// on `flush`.
pub struct Terminal {
    out: BufWriter<Stdout>,
    cols: u16,
    rows: u16,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        let mut out = BufWriter::new(io::stdout());
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { out, cols, rows })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Move to a 0-indexed screen cell
    pub fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        queue!(self.out, cursor::MoveTo(col, row))?;
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        queue!(self.out, Print(s))?;
        Ok(())
    }

    /// Blank the rest of the row in the current background
    pub fn clear_to_eol(&mut self) -> Result<()> {
        queue!(self.out, terminal::Clear(ClearType::UntilNewLine))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Block until a key press or a resize
    pub fn read_input(&mut self) -> Result<Input> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(Input::Key(key)),
                Event::Resize(cols, rows) => {
                    self.cols = cols;
                    self.rows = rows;
                    return Ok(Input::Resize);
                }
                _ => {}
            }
        }
    }

    /// Colors and attributes for the text written next
    pub fn apply_style(&mut self, style: &Style) -> Result<()> {
        queue!(
            self.out,
            SetForegroundColor(to_term_color(style.fg)),
            SetBackgroundColor(to_term_color(style.bg))
        )?;
        let attributes = [
            (style.bold, Attribute::Bold),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
        ];
        for (_, attribute) in attributes.into_iter().filter(|(on, _)| *on) {
            self.set_attribute(attribute)?;
        }
        Ok(())
    }

    /// Set a single attribute (`Reverse`, `Dim`, `Reset`, ...)
    pub fn set_attribute(&mut self, attribute: Attribute) -> Result<()> {
        queue!(self.out, SetAttribute(attribute))?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Map an overlay color onto crossterm's palette
fn to_term_color(color: Color) -> term_style::Color {
    use term_style::Color as C;
    match color {
        Color::Default => C::Reset,
        Color::Black => C::Black,
        Color::Red => C::DarkRed,
        Color::Green => C::DarkGreen,
        Color::Yellow => C::DarkYellow,
        Color::Blue => C::DarkBlue,
        Color::Magenta => C::DarkMagenta,
        Color::Cyan => C::DarkCyan,
        Color::White => C::Grey,
        Color::BrightBlack => C::DarkGrey,
        Color::BrightRed => C::Red,
        Color::BrightGreen => C::Green,
        Color::BrightYellow => C::Yellow,
        Color::BrightBlue => C::Blue,
        Color::BrightMagenta => C::Magenta,
        Color::BrightCyan => C::Cyan,
        Color::BrightWhite => C::White,
        Color::Rgb(r, g, b) => C::Rgb { r, g, b },
    }
}
