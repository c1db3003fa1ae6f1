//! Main TUI application state and logic

use crate::interpreter::catalog::{OutputKind, TypeMetaData};
use crate::interpreter::engine::Interpreter;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Catalog,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (left to right)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Catalog,
            FocusedPane::Catalog => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Catalog => FocusedPane::Source,
            FocusedPane::Output => FocusedPane::Catalog,
        }
    }
}

/// The main application state
pub struct App {
    /// A session with a parsed catalog
    pub interpreter: Interpreter,

    /// The header texts the catalog was built from, joined in append order
    pub source: String,

    /// Lines of `source` that precede each appended header
    pub line_starts: Vec<usize>,

    /// Output kind shown in the catalog and output panes
    pub kind: OutputKind,

    /// Aggregates declared as `kind`
    pub types: Vec<TypeMetaData>,

    /// Generated text for `kind`; `None` when generation failed
    pub output: Option<String>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub catalog_scroll: usize,
    pub output_scroll: usize,

    /// 1-based line of the last error within `source`, if it has one
    pub error_line: Option<usize>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether the status message reports an error
    pub is_error: bool,
}

impl App {
    /// Create a new app over `sources`, in the order they were appended to
    /// `interpreter`, and generate text for `kind`
    pub fn new(interpreter: Interpreter, sources: &[String], kind: OutputKind) -> Self {
        let (source, line_starts) = join_sources(sources);
        let mut app = App {
            interpreter,
            source,
            line_starts,
            kind,
            types: Vec::new(),
            output: None,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            catalog_scroll: 0,
            output_scroll: 0,
            error_line: None,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_error: false,
        };
        app.select_kind(kind);
        app
    }

    /// Switch the output kind, regenerating through the session
    pub fn select_kind(&mut self, kind: OutputKind) {
        self.kind = kind;
        self.catalog_scroll = 0;
        self.output_scroll = 0;
        self.types = self
            .interpreter
            .resolve(kind)
            .map(|types| types.into_iter().cloned().collect())
            .unwrap_or_default();

        match self.interpreter.generate(kind) {
            Ok(generated) => {
                self.output = Some(generated.text.clone());
                self.status_message = format!("Generated {}", kind);
                self.error_line = None;
                self.is_error = false;
            }
            Err(e) => {
                self.output = None;
                let base = e
                    .source_index()
                    .and_then(|i| self.line_starts.get(i).copied())
                    .unwrap_or(0);
                self.error_line = e.location().map(|l| base + l.line);
                self.status_message = e.to_string();
                self.is_error = true;
            }
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ])
            .split(main_chunks[0]);

        super::panes::render_source_pane(
            frame,
            columns[0],
            &self.source,
            self.error_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_catalog_pane(
            frame,
            columns[1],
            self.kind,
            &self.types,
            self.focused_pane == FocusedPane::Catalog,
            &mut self.catalog_scroll,
        );

        super::panes::render_output_pane(
            frame,
            columns[2],
            self.kind,
            self.output.as_deref(),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.kind,
            self.interpreter.type_count(),
            self.is_error,
        );
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Catalog => &mut self.catalog_scroll,
            FocusedPane::Output => &mut self.output_scroll,
        }
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('1') => self.select_kind(OutputKind::VertexInput),
            KeyCode::Char('2') => self.select_kind(OutputKind::ConstantBuffer),
            KeyCode::Char('3') => self.select_kind(OutputKind::StructuredBuffer),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(10);
            }
            _ => {}
        }
    }
}

/// Join header texts into one buffer, each starting on a fresh line.
///
/// Returns the buffer and, per header, how many lines precede it.
fn join_sources(sources: &[String]) -> (String, Vec<usize>) {
    let mut joined = String::new();
    let mut line_starts = Vec::with_capacity(sources.len());
    let mut lines = 0;

    for text in sources {
        line_starts.push(lines);
        joined.push_str(text);
        if !text.ends_with('\n') {
            joined.push('\n');
        }
        lines += text.lines().count();
    }
    (joined, line_starts)
}
