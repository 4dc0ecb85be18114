//! End-to-end compose pipeline: probe the audio duration, decode the still
//! image and overlay clip, render the composition, and encode an MP4 with
//! the audio attached.

use crate::assets::image::{crop_to_even, decode_still_image};
use crate::assets::media::{decode_overlay_clip, probe_media_duration};
use crate::audio::track::{
    MIX_SAMPLE_RATE, append_background_track, decode_audio_f32_stereo, write_pcm_f32le,
};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::KeylayResult;
use crate::render::session::{Compositor, CompositorConfig, CompositorOpts, RenderStats};
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs and output location for one composition run.
///
/// All sources are explicit; there are no process-wide default files.
#[derive(Clone, Debug)]
pub struct ComposeRequest {
    /// Still image shown beneath the keyed overlay.
    pub image_path: PathBuf,
    /// Audio track; its length is the authoritative output duration.
    pub audio_path: PathBuf,
    /// Greenscreen overlay video.
    pub overlay_path: PathBuf,
    /// Optional background music appended after the main audio, trimmed to
    /// the output duration.
    pub background_music: Option<PathBuf>,
    /// Output MP4 path.
    pub out_path: PathBuf,
}

/// Run the full pipeline and write an MP4 to `req.out_path`.
///
/// All-or-nothing: on any failure the partially written output file is
/// removed and the error propagated. Temporary audio files are cleaned up
/// on every path.
pub fn compose_to_mp4(
    req: &ComposeRequest,
    cfg: &CompositorConfig,
    opts: &CompositorOpts,
) -> KeylayResult<RenderStats> {
    match run(req, cfg, opts) {
        Ok(stats) => Ok(stats),
        Err(e) => {
            let _ = std::fs::remove_file(&req.out_path);
            Err(e)
        }
    }
}

fn run(
    req: &ComposeRequest,
    cfg: &CompositorConfig,
    opts: &CompositorOpts,
) -> KeylayResult<RenderStats> {
    let duration_secs = probe_media_duration(&req.audio_path)?;
    info!(duration_secs, audio = %req.audio_path.display(), "probed audio duration");

    let still = crop_to_even(&decode_still_image(&req.image_path)?)?;
    let overlay = decode_overlay_clip(&req.overlay_path, still.width, still.height, cfg.fps)?;

    let main = decode_audio_f32_stereo(&req.audio_path, MIX_SAMPLE_RATE)?;
    let pcm = match req.background_music.as_deref() {
        Some(music) => {
            let background = decode_audio_f32_stereo(music, MIX_SAMPLE_RATE)?;
            append_background_track(&main, &background, duration_secs)?
        }
        None => main,
    };

    let audio_tmp = TempFileGuard(temp_audio_path());
    write_pcm_f32le(&pcm, &audio_tmp.0)?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&req.out_path).with_audio(
        AudioInputConfig {
            path: audio_tmp.0.clone(),
            sample_rate: pcm.sample_rate,
            channels: pcm.channels,
        },
    ));

    let stats = Compositor::with_opts(cfg.clone(), opts.clone()).render(
        &still,
        &overlay,
        duration_secs,
        &mut sink,
    )?;
    info!(
        frames = stats.frames_total,
        out = %req.out_path.display(),
        "composition written"
    );
    Ok(stats)
}

fn temp_audio_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "keylay_audio_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
