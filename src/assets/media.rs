use crate::chroma::clip::OverlayClip;
use crate::foundation::core::{Fps, FrameRgb};
use crate::foundation::error::{KeylayError, KeylayResult};
use std::path::Path;

/// Probe a media file's container duration in seconds through `ffprobe`.
///
/// Returns [`KeylayError::InvalidDuration`] when the container reports no
/// duration or a non-positive one.
pub fn probe_media_duration(path: &Path) -> KeylayResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| KeylayError::encode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(KeylayError::unsupported(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| KeylayError::encode(format!("ffprobe json parse failed: {e}")))?;
    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| {
            KeylayError::invalid_duration(format!(
                "'{}' reports no duration",
                path.display()
            ))
        })?;

    validate_duration(duration)?;
    Ok(duration)
}

/// Reject non-finite and non-positive durations before any work happens.
pub fn validate_duration(secs: f64) -> KeylayResult<()> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(KeylayError::invalid_duration(format!(
            "duration must be > 0 seconds, got {secs}"
        )));
    }
    Ok(())
}

/// Decode an overlay video into RGB8 frames scaled to `width`x`height` and
/// resampled to `fps`, so output frame index `i` maps 1:1 onto clip frame
/// `i mod N`.
///
/// Resizing happens here, upstream of masking.
pub fn decode_overlay_clip(
    path: &Path,
    width: u32,
    height: u32,
    fps: Fps,
) -> KeylayResult<OverlayClip> {
    if width == 0 || height == 0 {
        return Err(KeylayError::dimension_mismatch(
            "overlay target size must be non-zero",
        ));
    }

    let filter = format!("scale={width}:{height},fps={}/{}", fps.num, fps.den);
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vf",
            &filter,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "pipe:1",
        ])
        .output()
        .map_err(|e| KeylayError::encode(format!("failed to run ffmpeg for overlay decode: {e}")))?;

    if !out.status.success() {
        return Err(KeylayError::unsupported(format!(
            "ffmpeg overlay decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    frames_from_rgb24(&out.stdout, width, height)
}

/// Split a raw rgb24 byte stream into an [`OverlayClip`].
pub(crate) fn frames_from_rgb24(bytes: &[u8], width: u32, height: u32) -> KeylayResult<OverlayClip> {
    let frame_len = width as usize * height as usize * 3;
    if frame_len == 0 {
        return Err(KeylayError::dimension_mismatch(
            "overlay frame size must be non-zero",
        ));
    }
    if !bytes.len().is_multiple_of(frame_len) {
        return Err(KeylayError::unsupported(format!(
            "overlay byte stream is {} bytes, expected a multiple of {frame_len}",
            bytes.len()
        )));
    }

    let mut frames = Vec::with_capacity(bytes.len() / frame_len);
    for chunk in bytes.chunks_exact(frame_len) {
        frames.push(FrameRgb::new(width, height, chunk.to_vec())?);
    }
    OverlayClip::new(frames)
}
