use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use magic_move::{
    EngineConfig, EngineState, ExportCancel, FontFace, FrameRenderer, ParsedDocument,
    SyntectTokenizer, parse_document,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "magic-move", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and list its blocks, steps and errors.
    Check(CheckArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the animation to a video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input markdown document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print the parse result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Input markdown document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine configuration JSON (camelCase keys).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Block to use (0-based); defaults to the first usable block.
    #[arg(long)]
    block: Option<usize>,

    /// Font file; defaults to a system monospace face.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Highlighting theme.
    #[arg(long)]
    theme: Option<String>,

    /// Show line numbers on every step.
    #[arg(long)]
    line_numbers: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Timeline position in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Output video path; `.mp4` selects H.264, anything else VP9/WebM.
    #[arg(long, default_value = magic_move::encode::ffmpeg::DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read document '{}'", path.display()))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let doc = parse_document(&read_document(&args.in_path)?);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("serialize parse result")?
        );
    } else {
        print_document(&doc);
    }
    if doc.first_usable_block().is_none() {
        anyhow::bail!("no usable magic-move block in '{}'", args.in_path.display());
    }
    Ok(())
}

fn print_document(doc: &ParsedDocument) {
    for e in &doc.errors {
        println!("error: {e}");
    }
    for (i, block) in doc.blocks.iter().enumerate() {
        println!(
            "block {i} ({:?}, line {}): {} step(s)",
            block.kind,
            block.line,
            block.steps.len()
        );
        for (j, step) in block.steps.iter().enumerate() {
            println!(
                "  step {j}: {} lines={} startLine={} ({} line(s))",
                if step.language.is_empty() { "-" } else { step.language.as_str() },
                step.meta.show_line_numbers,
                step.meta.start_line,
                step.code.split('\n').count()
            );
        }
        for e in &block.errors {
            println!("  error: {e}");
        }
    }
}

fn build_engine(args: &EngineArgs, fps: Option<u32>) -> anyhow::Result<EngineState> {
    let mut cfg = match &args.config {
        Some(p) => EngineConfig::from_path(p)?,
        None => EngineConfig::default(),
    };
    if let Some(font) = &args.font {
        cfg.font_path = Some(font.clone());
    }
    if let Some(theme) = &args.theme {
        cfg.theme = theme.clone();
    }
    if args.line_numbers {
        cfg.force_line_numbers = true;
    }
    if let Some(fps) = fps {
        cfg.fps = fps;
    }

    let face = FontFace::resolve(cfg.font_path.as_deref())?;
    tracing::info!(font = %face.source, "font loaded");
    let renderer = FrameRenderer::new(face)?;
    let mut engine = EngineState::new(cfg, Box::new(SyntectTokenizer::new()), renderer)?;

    engine.set_document(&read_document(&args.in_path)?);
    for e in &engine.document().errors {
        tracing::warn!("{e}");
    }
    match args.block {
        Some(i) => engine.select_block(i)?,
        None if engine.active_block().is_none() => {
            anyhow::bail!("no usable magic-move block in '{}'", args.in_path.display())
        }
        None => {}
    }
    engine.rebuild_layouts()?;
    Ok(engine)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(&args.engine, None)?;
    let state = engine.seek(args.at_ms)?;
    tracing::info!(?state, at_ms = args.at_ms, "rendering frame");
    engine.render_current()?;
    let frame = engine.frame();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(&args.engine, args.fps)?;
    let mut next_report = 0.0;
    let artifact = engine.export_video(&args.out, &ExportCancel::new(), &mut |p| {
        if p >= next_report {
            tracing::info!("export {:>3.0}%", p * 100.0);
            next_report = if p >= 1.0 { f64::INFINITY } else { p + 0.1 };
        }
    })?;

    eprintln!(
        "wrote {} ({} frames, {}x{})",
        artifact.path.display(),
        artifact.stats.frames,
        artifact.stats.width,
        artifact.stats.height
    );
    Ok(())
}
