use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use keylay::{
    ComposeRequest, Compositor, CompositorConfig, CompositorOpts, Fps, FrameIndex, KeyColor,
    compose_to_mp4,
};

#[derive(Parser, Debug)]
#[command(name = "keylay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a single frame as a PNG.
    Frame(FrameArgs),
    /// Compose the full video as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Key color as R,G,B (default pure green).
    #[arg(long, default_value = "0,255,0", value_parser = parse_rgb)]
    key_color: [u8; 3],

    /// Per-channel similarity radius (0 = exact matches only, 255 = all).
    #[arg(long, default_value_t = 100)]
    tolerance: u8,

    /// Intro scale-in ramp length in seconds; 0 disables the effect.
    #[arg(long, default_value_t = 1.0)]
    intro_ramp: f64,

    /// Output frame rate.
    #[arg(long, default_value_t = 24)]
    fps: u32,
}

impl KeyArgs {
    fn config(&self) -> anyhow::Result<CompositorConfig> {
        Ok(CompositorConfig {
            key: KeyColor::with_tolerance(self.key_color, self.tolerance),
            fps: Fps::new(self.fps, 1).context("invalid --fps")?,
            intro_ramp_secs: (self.intro_ramp > 0.0).then_some(self.intro_ramp),
        })
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Still image shown beneath the keyed overlay.
    #[arg(long)]
    image: PathBuf,

    /// Greenscreen overlay video.
    #[arg(long)]
    overlay: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    key: KeyArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Still image shown beneath the keyed overlay.
    #[arg(long)]
    image: PathBuf,

    /// Audio track; its length sets the output duration.
    #[arg(long)]
    audio: PathBuf,

    /// Greenscreen overlay video.
    #[arg(long)]
    overlay: PathBuf,

    /// Optional background music appended after the main audio.
    #[arg(long)]
    bg_music: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    key: KeyArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.key.config()?;
    let still = keylay::assets::image::decode_still_image(&args.image)?;
    let overlay = keylay::assets::media::decode_overlay_clip(
        &args.overlay,
        still.width,
        still.height,
        cfg.fps,
    )?;

    let frame = Compositor::new(cfg).compose_at(&still, &overlay, FrameIndex(args.frame))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.key.config()?;
    let opts = CompositorOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..CompositorOpts::default()
    };
    let req = ComposeRequest {
        image_path: args.image,
        audio_path: args.audio,
        overlay_path: args.overlay,
        background_music: args.bg_music,
        out_path: args.out,
    };

    let stats = compose_to_mp4(&req, &cfg, &opts)?;
    eprintln!("wrote {} ({} frames)", req.out_path.display(), stats.frames_total);
    Ok(())
}

fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("expected R,G,B".to_owned());
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("bad channel '{part}': {e}"))?;
    }
    Ok(rgb)
}
