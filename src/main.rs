//! quill-overlay - terminal previewer for the QuillMark syntax overlay
//!
//! Shows a document with its metadata blocks highlighted, acting as the
//! host editor for the overlay engine.

mod preview;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;

use crossterm::event::{KeyCode, KeyModifiers};
use tracing_subscriber::EnvFilter;

use quillmark_overlay::config::{resolve_theme, Config};
use quillmark_overlay::syntax::{HostEvent, OverlayAdapter, SubscriptionId, Subscriptions};
use quillmark_overlay::{Buffer, OverlayError, Result, TextSource};

use preview::{render_completions, render_dump, PreviewHost};
use terminal::{Input, Terminal};

/// Parsed command line
struct Args {
    file: PathBuf,
    dump: bool,
    complete: Option<(usize, usize)>,
    theme: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let interactive = !args.dump && args.complete.is_none();
    init_logging(interactive);

    let mut config = Config::load();
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    let theme = config.theme_snapshot()?;
    let buffer = Buffer::from_file(&args.file)?;

    if let Some((line, column)) = args.complete {
        print!("{}", render_completions(&buffer, line, column));
        return Ok(());
    }
    if args.dump {
        print!("{}", render_dump(&buffer, &theme)?);
        return Ok(());
    }

    let terminal = Terminal::new()?;
    let mut app = App::new(terminal, PreviewHost::new(buffer, theme, config));
    app.run()
}

/// Log to the file named by QUILL_OVERLAY_LOG; without it, log to stderr
/// only when the screen is not taken over by the previewer.
fn init_logging(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(path) = env::var_os("QUILL_OVERLAY_LOG").map(PathBuf::from) {
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();
            tracing::info!(path = ?path, "logging initialized");
            return;
        }
    }

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn parse_args() -> Result<Option<Args>> {
    let mut file = None;
    let mut dump = false;
    let mut complete = None;
    let mut theme = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                println!("quill-overlay {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--dump" => dump = true,
            "--theme" => theme = Some(next_value(&mut args, "--theme")?),
            "--complete" => {
                let value = next_value(&mut args, "--complete")?;
                complete = Some(parse_position(&value)?);
            }
            other if other.starts_with('-') => {
                return Err(OverlayError::Message(format!("unknown option: {other}")));
            }
            other => file = Some(PathBuf::from(other)),
        }
    }

    let Some(file) = file else {
        print_usage();
        return Err(OverlayError::Message("no file given".to_string()));
    };
    Ok(Some(Args {
        file,
        dump,
        complete,
        theme,
    }))
}

fn next_value(args: &mut impl Iterator<Item = String>, option: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| OverlayError::Message(format!("{option} needs a value")))
}

/// Parse `LINE:COL`
fn parse_position(value: &str) -> Result<(usize, usize)> {
    let invalid = || OverlayError::Message(format!("expected LINE:COL, got {value:?}"));
    let (line, column) = value.split_once(':').ok_or_else(invalid)?;
    let line = line.parse().map_err(|_| invalid())?;
    let column = column.parse().map_err(|_| invalid())?;
    Ok((line, column))
}

fn print_usage() {
    println!("quill-overlay {} - QuillMark overlay previewer", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: quill-overlay [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -h, --help             Show this help message");
    println!("  -V, --version          Show version information");
    println!("      --dump             Print lines with their decorations and exit");
    println!("      --complete L:C     Print completions at line L, byte column C and exit");
    println!("      --theme NAME|PATH  Use a built-in theme (dark, light) or a TOML theme file");
    println!();
    println!("Keys:");
    println!("  j, Down         Scroll down one line");
    println!("  k, Up           Scroll up one line");
    println!("  Space, PageDown Scroll down one page");
    println!("  PageUp          Scroll up one page");
    println!("  r               Reload the file");
    println!("  t               Toggle dark/light theme");
    println!("  h               Toggle highlighting");
    println!("  q, C-c          Quit");
}

/// The previewer: a host, its event subscribers and the screen
struct App {
    terminal: Terminal,
    host: PreviewHost,
    subscriptions: Subscriptions,
    overlay: Option<SubscriptionId>,
}

impl App {
    fn new(terminal: Terminal, host: PreviewHost) -> Self {
        Self {
            terminal,
            host,
            subscriptions: Subscriptions::new(),
            overlay: None,
        }
    }

    fn text_rows(&self) -> usize {
        self.terminal.rows().saturating_sub(1) as usize
    }

    fn run(&mut self) -> Result<()> {
        if self.host.config.highlight {
            self.enable_overlay();
        }

        loop {
            self.host.render(&mut self.terminal, self.overlay.is_some())?;

            let page = self.text_rows().max(1) as isize;
            match self.terminal.read_input()? {
                Input::Resize => self.emit(HostEvent::VisibleRangeChanged {
                    lines: self.host.visible_lines(self.text_rows()),
                }),
                Input::Key(key) => match (key.code, key.modifiers) {
                    (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    (KeyCode::Char('j'), _) | (KeyCode::Down, _) => self.scroll(1),
                    (KeyCode::Char('k'), _) | (KeyCode::Up, _) => self.scroll(-1),
                    (KeyCode::Char(' '), _) | (KeyCode::PageDown, _) => self.scroll(page),
                    (KeyCode::PageUp, _) => self.scroll(-page),
                    (KeyCode::Char('r'), _) => self.reload(),
                    (KeyCode::Char('t'), _) => self.toggle_theme(),
                    (KeyCode::Char('h'), _) => self.toggle_overlay(),
                    _ => {}
                },
            }
        }
    }

    /// Deliver an event; errors go to the status line
    fn emit(&mut self, event: HostEvent) {
        match self.subscriptions.emit(&event, &mut self.host) {
            Ok(()) => {}
            Err(err) => {
                tracing::warn!(error = %err, ?event, "overlay rejected event");
                self.host.message = Some(err.to_string());
            }
        }
    }

    fn scroll(&mut self, delta: isize) {
        let before = self.host.top_line;
        self.host.scroll(delta);
        if self.host.top_line != before {
            self.emit(HostEvent::VisibleRangeChanged {
                lines: self.host.visible_lines(self.text_rows()),
            });
        }
    }

    fn reload(&mut self) {
        match self.host.buffer.reload() {
            Ok(lines) => {
                self.host.scroll(0);
                let count = self.host.buffer.line_count();
                self.host.message = Some(format!("reloaded {count} lines"));
                self.emit(HostEvent::VisibleRangeChanged {
                    lines: self.host.visible_lines(self.text_rows()),
                });
                self.emit(HostEvent::DocumentChanged { lines });
            }
            Err(err) => self.host.message = Some(err.to_string()),
        }
    }

    fn toggle_theme(&mut self) {
        let next = if self.host.theme.name() == "dark" { "light" } else { "dark" };
        match resolve_theme(next) {
            Ok(theme) => {
                self.host.theme = theme;
                self.host.message = None;
                self.emit(HostEvent::ThemeChanged);
            }
            Err(err) => self.host.message = Some(err.to_string()),
        }
    }

    fn enable_overlay(&mut self) {
        let visible = self.host.visible_lines(self.text_rows());
        match OverlayAdapter::new(&self.host.theme, visible.clone()) {
            Ok(adapter) => {
                self.overlay = Some(adapter.attach(&mut self.subscriptions));
                self.emit(HostEvent::VisibleRangeChanged { lines: visible });
            }
            Err(err) => self.host.message = Some(err.to_string()),
        }
    }

    fn toggle_overlay(&mut self) {
        match self.overlay.take() {
            Some(id) => {
                self.subscriptions.unsubscribe(id);
                self.host.clear_decorations();
            }
            None => self.enable_overlay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("3:7").unwrap(), (3, 7));
        assert!(parse_position("3").is_err());
        assert!(parse_position("a:1").is_err());
    }
}
