use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tessera::{
    AlignedPadding, DrawOptions, FrameCache, FrameDuration, HAlign, InterruptFlag, Padding,
    RenderArgs, RenderClass, RenderableExt, Seek, Size, StdoutTerminal, TEXT_FRAMES, TEXT_STREAM,
    Terminal, TextFrames, TextStream, VAlign,
};

#[derive(Parser, Debug)]
#[command(name = "tessera", version)]
struct Cli {
    /// Diagnostics written to stderr at or above this level.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one frame of a text frames file.
    Frame(FrameArgs),
    /// Draw a text frames file to the terminal, animating it if it has several frames.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Text file; frames are separated by lines equal to `--separator`.
    path: PathBuf,

    #[arg(long, default_value = "---")]
    separator: String,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: usize,

    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Text file; frames are separated by lines equal to `--separator`.
    path: PathBuf,

    #[arg(long, default_value = "---")]
    separator: String,

    /// Frame duration in milliseconds.
    #[arg(long, default_value_t = 100)]
    duration: u32,

    /// Times to play the animation; negative loops until interrupted.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    loops: i64,

    /// Play the file as a stream of frames this many lines tall.
    #[arg(long, value_name = "LINES")]
    stream: Option<u32>,

    /// Stream frame width; defaults to the terminal width.
    #[arg(long, requires = "stream")]
    columns: Option<u32>,

    /// Draw only the first frame.
    #[arg(long)]
    no_animate: bool,

    #[arg(long)]
    no_cache: bool,

    /// Skip the terminal size check.
    #[arg(long)]
    no_size_check: bool,

    /// Let still output run past the bottom of the terminal.
    #[arg(long)]
    allow_scroll: bool,

    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Render args as JSON, keyed by class name then field name.
    #[arg(long)]
    args: Option<String>,

    /// Minimum padded width; zero or negative is relative to the terminal width.
    #[arg(long, allow_negative_numbers = true)]
    width: Option<i32>,

    /// Minimum padded height; zero or negative is relative to the terminal height.
    #[arg(long, allow_negative_numbers = true)]
    height: Option<i32>,

    #[arg(long, value_enum, default_value_t = Horizontal::Center)]
    h_align: Horizontal,

    #[arg(long, value_enum, default_value_t = Vertical::Middle)]
    v_align: Vertical,

    /// Padding character.
    #[arg(long, default_value_t = ' ')]
    fill: char,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Vertical {
    Top,
    Middle,
    Bottom,
}

impl LayoutArgs {
    fn padding(&self) -> anyhow::Result<Padding> {
        if self.width.is_none() && self.height.is_none() {
            return Ok(Padding::default());
        }
        let h_align = match self.h_align {
            Horizontal::Left => HAlign::Left,
            Horizontal::Center => HAlign::Center,
            Horizontal::Right => HAlign::Right,
        };
        let v_align = match self.v_align {
            Vertical::Top => VAlign::Top,
            Vertical::Middle => VAlign::Middle,
            Vertical::Bottom => VAlign::Bottom,
        };
        let padding = AlignedPadding::new(self.width.unwrap_or(1), self.height.unwrap_or(1))
            .aligned(h_align, v_align)
            .with_fill(self.fill)?;
        Ok(padding.into())
    }

    fn render_args(&self, class: &'static RenderClass) -> anyhow::Result<Option<RenderArgs>> {
        let Some(json) = self.args.as_deref() else {
            return Ok(None);
        };
        let value: serde_json::Value =
            serde_json::from_str(json).with_context(|| "parse --args JSON")?;
        Ok(Some(RenderArgs::from_json(class, &value)?))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_frames(path: &Path, separator: &str, duration: u32) -> anyhow::Result<TextFrames> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read frames '{}'", path.display()))?;
    let frames = TextFrames::parse(&text, separator, Some(FrameDuration::Static(duration)))
        .with_context(|| format!("parse frames '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "loaded text frames");
    Ok(frames)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut frames = read_frames(&args.path, &args.separator, 100)?;
    frames.seek(isize::try_from(args.frame)?, Seek::Start)?;
    let render_args = args.layout.render_args(&TEXT_FRAMES)?;

    let mut padding = args.layout.padding()?;
    if padding.is_relative() {
        padding = padding.resolve(StdoutTerminal::new().size()?);
    }

    let frame = frames.render(render_args.as_ref(), padding)?;
    println!("{}", frame.render_output);
    Ok(())
}

/// Ctrl-C raises the returned flag, so a running draw stops at its next write and restores
/// the cursor instead of the process dying mid-frame.
fn interrupt_on_sigint() -> anyhow::Result<InterruptFlag> {
    let flag = InterruptFlag::new();
    signal_hook::flag::register(signal_hook::consts::SIGINT, flag.shared())
        .context("install SIGINT handler")?;
    Ok(flag)
}

fn draw_options(args: &PlayArgs, interrupt: InterruptFlag) -> DrawOptions {
    DrawOptions {
        animate: !args.no_animate,
        loops: args.loops,
        cache: if args.no_cache {
            FrameCache::Toggle(false)
        } else {
            FrameCache::default()
        },
        check_size: !args.no_size_check,
        allow_scroll: args.allow_scroll,
        interrupt: Some(interrupt),
        ..DrawOptions::default()
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let opts = draw_options(&args, interrupt_on_sigint()?);
    let padding = args.layout.padding()?;
    let mut term = StdoutTerminal::new();

    if let Some(lines) = args.stream {
        let columns = match args.columns {
            Some(columns) => columns,
            None => term.size()?.width,
        };
        let path = args.path.clone();
        let stream = TextStream::new(
            Size::new(columns, lines),
            FrameDuration::Static(args.duration),
            move || Ok(Box::new(BufReader::new(File::open(&path)?)) as Box<dyn BufRead + Send>),
        )?;
        let render_args = args.layout.render_args(&TEXT_STREAM)?;
        stream.draw(&mut term, render_args.as_ref(), padding, &opts)?;
    } else {
        let frames = read_frames(&args.path, &args.separator, args.duration)?;
        let render_args = args.layout.render_args(&TEXT_FRAMES)?;
        frames.draw(&mut term, render_args.as_ref(), padding, &opts)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bin/tessera.rs"]
mod tests;
