use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "lesson-reel", version, about = "Narrated video export for study presentations")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a presentation as a narrated video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Render the presentation frame as a PNG.
    Frame(FrameArgs),
    /// Fetch and decode a narration clip and print its format.
    Probe(ProbeArgs),
    /// Convert a raw summarization reply into presentation JSON.
    Intake(IntakeArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Narration locator overriding the one in the JSON (path, data: URL or http(s) URL).
    #[arg(long)]
    audio: Option<String>,

    /// Directory the video is saved into.
    #[arg(long, env = "LESSON_REEL_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// TTF/OTF font used for all text.
    #[arg(long, env = "LESSON_REEL_FONT")]
    font: PathBuf,

    /// Output container.
    #[arg(long, default_value = "mp4")]
    container: lesson_reel::Container,

    /// Capture rate in frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Print diagnostics about the font (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// TTF/OTF font used for all text.
    #[arg(long, env = "LESSON_REEL_FONT")]
    font: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print diagnostics about the font (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Narration locator (path, data: URL or http(s) URL).
    #[arg(long)]
    audio: String,
}

#[derive(Parser, Debug)]
struct IntakeArgs {
    /// File holding the raw reply text.
    #[arg(long)]
    reply: PathBuf,

    /// Narration locator stored in the output.
    #[arg(long, default_value = "narration.mp3")]
    audio: String,

    /// Output JSON path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Probe(args) => cmd_probe(args),
        Command::Intake(args) => cmd_intake(args),
    }
}

fn read_content_json(path: &Path) -> anyhow::Result<lesson_reel::PresentationContent> {
    let f = File::open(path).with_context(|| format!("open presentation '{}'", path.display()))?;
    let r = BufReader::new(f);
    let content: lesson_reel::PresentationContent =
        serde_json::from_reader(r).with_context(|| "parse presentation JSON")?;
    content.validate()?;
    Ok(content)
}

fn make_renderer(font: &Path, dump_fonts: bool) -> anyhow::Result<lesson_reel::FrameRenderer> {
    let engine = lesson_reel::TextLayoutEngine::from_path(font)?;
    if dump_fonts {
        eprintln!("text font diagnostics:");
        eprintln!("  font_source: {}", font.display());
        eprintln!("  family:      {}", engine.family_name());
        eprintln!("  sha256:      {}", sha256_hex(engine.font_bytes()));
    }
    Ok(lesson_reel::FrameRenderer::new(
        engine,
        lesson_reel::FrameStyle::default(),
    ))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut content = read_content_json(&args.in_path)?;
    if let Some(audio) = &args.audio {
        content.audio = lesson_reel::AudioLocator::parse(audio)?;
    }

    let renderer = make_renderer(&args.font, args.dump_fonts)?;
    let opts = lesson_reel::ExportOpts {
        fps: lesson_reel::Fps::new(args.fps, 1)?,
        ..lesson_reel::ExportOpts::default()
    };
    let mut exporter = lesson_reel::Exporter::new(
        Box::new(renderer),
        Arc::new(lesson_reel::LogNotifier),
        opts,
    );
    let mut sink = lesson_reel::FfmpegSink::new(lesson_reel::FfmpegSinkOpts::new(args.container));
    let mut download = lesson_reel::DirectoryDownload::new(&args.out_dir);

    let report = exporter
        .export(&content, &mut sink, &mut download)
        .with_context(|| format!("export '{}'", content.title))?;

    eprintln!(
        "recorded {} frames ({} of narration)",
        report.frames,
        lesson_reel::format_time(report.audio_duration)
    );
    println!("{}", report.path.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let content = read_content_json(&args.in_path)?;
    let mut renderer = make_renderer(&args.font, args.dump_fonts)?;

    let layout = renderer.layout(&content)?;
    if layout.title_clipped {
        eprintln!(
            "warning: title clipped at {}px to fit the frame",
            layout.title_size_px
        );
    }
    if layout.summary_clipped {
        eprintln!(
            "warning: summary clipped at {}px to fit the frame",
            layout.summary_size_px
        );
    }
    let frame = renderer.render_layout(&layout)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let locator = lesson_reel::AudioLocator::parse(&args.audio)?;
    let bytes = lesson_reel::AudioFetcher::new().fetch(&locator)?;
    let hint = lesson_reel::decode_hint(&locator);
    let audio = lesson_reel::decode_audio(bytes, hint.as_deref())?;

    println!("source:      {}", locator.describe());
    println!("sample_rate: {}", audio.sample_rate);
    println!("channels:    {}", audio.channels);
    println!("duration:    {}", lesson_reel::format_time(audio.duration()));
    println!(
        "frames@30:   {}",
        lesson_reel::RecordingDeadline::arm(audio.duration(), lesson_reel::Fps::EXPORT)?.frames()
    );
    Ok(())
}

fn cmd_intake(args: IntakeArgs) -> anyhow::Result<()> {
    let reply = std::fs::read_to_string(&args.reply)
        .with_context(|| format!("read reply '{}'", args.reply.display()))?;
    let audio = lesson_reel::AudioLocator::parse(&args.audio)?;
    let content = lesson_reel::PresentationContent::from_reply(&reply, audio)?;
    let json = serde_json::to_string_pretty(&content).context("serialize presentation JSON")?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json + "\n")
                .with_context(|| format!("write presentation '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
