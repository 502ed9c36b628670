use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use simvis::{
    Canvas, ExportRequest, FfmpegEncoder, FfmpegEncoderOpts, FrameRGBA, IconSet, LogProgress,
    PlaybackController, PlaybackOpts, RecordingView, Rgb, Scene, SceneOpts, SimulationRecord,
    SpriteScene, TickIndex, VectorDescription,
};

#[derive(Parser, Debug)]
#[command(name = "simvis", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize one icon at a scale and angle as a PNG.
    Sprite(SpriteArgs),
    /// Render a single tick of a recorded simulation as a PNG.
    Frame(FrameArgs),
    /// Export a tick range as MP4 (requires `ffmpeg` on PATH).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct SpriteArgs {
    /// Vector description JSON.
    #[arg(long)]
    icon: PathBuf,

    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Clockwise degrees.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    angle: i32,

    /// Replace a palette color, as `id=rrggbb`. Repeatable.
    #[arg(long = "color", value_parser = parse_color_override)]
    colors: Vec<(String, Rgb)>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Simulation record JSON.
    #[arg(long)]
    record: PathBuf,

    /// Directory of icon JSON files, named after the icons the record uses.
    #[arg(long)]
    icons: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Stamp the tick number in the top-left corner.
    #[arg(long, default_value_t = false)]
    annotate: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Tick index (0-based); clamped to the record.
    #[arg(long, default_value_t = 0)]
    tick: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 0)]
    first: u64,

    /// Last tick, inclusive. Defaults to the end of the record.
    #[arg(long)]
    last: Option<u64>,

    /// 0 is best; mapped to x264 `-crf`.
    #[arg(long, default_value_t = 0)]
    quality: u8,
}

fn parse_color_override(s: &str) -> Result<(String, Rgb), String> {
    let (id, hex) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=rrggbb, got '{s}'"))?;
    let rgb = Rgb::from_hex(hex).map_err(|e| e.to_string())?;
    Ok((id.to_string(), rgb))
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
        Command::Sprite(args) => cmd_sprite(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn load_scene(args: &SceneArgs) -> anyhow::Result<SpriteScene> {
    let record = SimulationRecord::from_path(&args.record)?;
    let icons = IconSet::load_dir(&args.icons)?;
    let opts = SceneOpts {
        canvas: Canvas::new(args.width, args.height)?,
        zoom: args.zoom,
        ..SceneOpts::default()
    };
    Ok(SpriteScene::new(icons, record, opts)?)
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(out = %path.display(), "wrote png");
    Ok(())
}

fn cmd_sprite(args: SpriteArgs) -> anyhow::Result<()> {
    let mut desc = VectorDescription::from_path(&args.icon)?;
    if !args.colors.is_empty() {
        let overrides: HashMap<String, Rgb> = args.colors.into_iter().collect();
        desc = desc.with_color_overrides(&overrides)?;
    }
    let sprite = simvis::rasterize(&desc, args.scale, args.angle)?;
    write_png(&args.out, &sprite.to_frame())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let tick = TickIndex(args.tick.min(scene.max_tick().0));
    let frame = scene.render_tick(tick, args.scene.annotate)?;
    write_png(&args.out, &frame)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene: Arc<dyn Scene> = Arc::new(load_scene(&args.scene)?);
    let req = ExportRequest {
        first: TickIndex(args.first),
        last: TickIndex(args.last.unwrap_or(scene.max_tick().0)),
        quality: args.quality,
        annotate_frame_number: args.scene.annotate,
    };

    let mut ctl = PlaybackController::new(scene, RecordingView::default(), PlaybackOpts::from_env())?;
    let encoder = FfmpegEncoder::new(FfmpegEncoderOpts::new(&args.out));
    ctl.begin_export(req, Box::new(encoder), Box::new(LogProgress))?;
    ctl.wait_for_export();

    let stats = ctl
        .take_export_result()
        .context("export finished without a result")??;
    tracing::info!(
        frames = stats.frames_encoded,
        out = %args.out.display(),
        "export complete"
    );
    Ok(())
}
