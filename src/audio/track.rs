use crate::foundation::error::{KeylayError, KeylayResult};
use std::path::Path;

/// Sample rate used across the decode/append/encode audio path.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Duration in seconds represented by the samples.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        let frames = self.interleaved_f32.len() / usize::from(self.channels);
        frames as f64 / f64::from(self.sample_rate)
    }
}

/// Decode an audio file to stereo interleaved `f32` PCM through `ffmpeg`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> KeylayResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| KeylayError::encode(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(KeylayError::unsupported(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(KeylayError::unsupported(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

/// Append a background track after the main track, trimmed to
/// `duration_secs`.
///
/// Mirrors the original application's audio assembly: the narration plays
/// in full, then the background music (cut to the video length) follows.
/// The encoder's `-shortest` flag trims the total to the video duration.
pub fn append_background_track(
    main: &AudioPcm,
    background: &AudioPcm,
    duration_secs: f64,
) -> KeylayResult<AudioPcm> {
    if main.sample_rate != background.sample_rate || main.channels != background.channels {
        return Err(KeylayError::unsupported(format!(
            "audio format mismatch: main {} Hz x{} vs background {} Hz x{}",
            main.sample_rate, main.channels, background.sample_rate, background.channels
        )));
    }
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(KeylayError::invalid_duration(format!(
            "background trim length must be >= 0 seconds, got {duration_secs}"
        )));
    }

    let channels = usize::from(main.channels);
    let trim_frames = (duration_secs * f64::from(main.sample_rate)).round() as usize;
    let trim_samples =
        (trim_frames * channels).min(background.interleaved_f32.len());

    let mut interleaved_f32 =
        Vec::with_capacity(main.interleaved_f32.len() + trim_samples);
    interleaved_f32.extend_from_slice(&main.interleaved_f32);
    interleaved_f32.extend_from_slice(&background.interleaved_f32[..trim_samples]);
    for s in &mut interleaved_f32 {
        *s = s.clamp(-1.0, 1.0);
    }

    Ok(AudioPcm {
        sample_rate: main.sample_rate,
        channels: main.channels,
        interleaved_f32,
    })
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_pcm_f32le(pcm: &AudioPcm, out_path: &Path) -> KeylayResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            KeylayError::encode(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(pcm.interleaved_f32.len() * 4);
    for &sample in &pcm.interleaved_f32 {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        KeylayError::encode(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}
