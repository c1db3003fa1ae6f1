// shaderdecl: shader declarations from annotated C++ struct headers

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shaderdecl::interpreter::catalog::OutputKind;
use shaderdecl::interpreter::engine::Interpreter;
use shaderdecl::ui::App;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Vertex,
    Cbuffer,
    Structured,
}

impl From<Kind> for OutputKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Vertex => OutputKind::VertexInput,
            Kind::Cbuffer => OutputKind::ConstantBuffer,
            Kind::Structured => OutputKind::StructuredBuffer,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "shaderdecl",
    about = "Generate shader declarations from annotated C++ struct headers"
)]
struct Args {
    /// Header files declared as `--kind`; later files see aliases declared
    /// in earlier ones
    inputs: Vec<PathBuf>,

    /// Output kind of the aggregates in positional inputs
    #[arg(long, value_enum, default_value_t = Kind::Vertex)]
    kind: Kind,

    /// Header of vertex input structs (repeatable)
    #[arg(long, value_name = "FILE")]
    vertex: Vec<PathBuf>,

    /// Header of constant buffers (repeatable)
    #[arg(long, value_name = "FILE")]
    cbuffer: Vec<PathBuf>,

    /// Header of structured buffer elements (repeatable)
    #[arg(long, value_name = "FILE")]
    structured: Vec<PathBuf>,

    /// Write generated text here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Browse the catalog in a terminal UI
    #[arg(long)]
    tui: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Every input with the kind its aggregates are declared as: positional
    /// inputs first, then vertex, constant and structured buffer headers.
    fn sources(&self) -> Vec<(&PathBuf, OutputKind)> {
        let positional = self.inputs.iter().map(|p| (p, OutputKind::from(self.kind)));
        let tagged = [
            (&self.vertex, OutputKind::VertexInput),
            (&self.cbuffer, OutputKind::ConstantBuffer),
            (&self.structured, OutputKind::StructuredBuffer),
        ];
        positional
            .chain(
                tagged
                    .into_iter()
                    .flat_map(|(paths, kind)| paths.iter().map(move |p| (p, kind))),
            )
            .collect()
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let inputs = args.sources();
    if inputs.is_empty() {
        bail!("no input headers given");
    }

    let mut session = Interpreter::new();
    let mut sources = Vec::with_capacity(inputs.len());

    for (path, kind) in inputs {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        session
            .append_source(&source, kind)
            .with_context(|| format!("failed to compile {} as {}", path.display(), kind))?;
        sources.push(source);
    }
    info!(types = session.type_count(), files = sources.len(), "catalog ready");

    if args.tui {
        let kind = session.kinds().first().copied().unwrap_or(args.kind.into());
        return run_tui(session, &sources, kind);
    }

    let mut text = String::new();
    for kind in session.kinds() {
        let generated = session
            .generate(kind)
            .with_context(|| format!("failed to generate {}", kind))?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&generated.text);
    }

    match &args.out {
        Some(path) => fs::write(path, &text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", text),
    }

    Ok(())
}

fn run_tui(session: Interpreter, sources: &[String], kind: OutputKind) -> Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, sources, kind);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}
