use crate::foundation::core::{Fps, FrameIndex, FrameRgb};
use crate::foundation::error::KeylayResult;
use std::path::PathBuf;

/// Configuration provided to a [`FrameSink`] at the start of a render.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Raw PCM audio input for sinks that attach an audio track.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Sink contract for consuming composited frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing
/// `FrameIndex` order. On render failure `end` is never called, so a sink
/// must not expose partial output until `end` succeeds.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> KeylayResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> KeylayResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> KeylayResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    frames: Vec<(FrameIndex, FrameRgb)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Return `true` once `end` has been called.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Borrow the captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> KeylayResult<()> {
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> KeylayResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> KeylayResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_captures_in_order() {
        let mut sink = InMemorySink::new();
        sink.begin(SinkConfig {
            width: 1,
            height: 1,
            fps: Fps::default(),
        })
        .unwrap();
        for i in 0..3 {
            sink.push_frame(FrameIndex(i), &FrameRgb::filled(1, 1, [i as u8, 0, 0]))
                .unwrap();
        }
        sink.end().unwrap();

        assert!(sink.ended());
        assert_eq!(sink.frames().len(), 3);
        for (i, (idx, frame)) in sink.frames().iter().enumerate() {
            assert_eq!(idx.0, i as u64);
            assert_eq!(frame.pixel(0, 0)[0], i as u8);
        }
    }

    #[test]
    fn begin_resets_previous_capture() {
        let mut sink = InMemorySink::new();
        let cfg = SinkConfig {
            width: 1,
            height: 1,
            fps: Fps::default(),
        };
        sink.begin(cfg.clone()).unwrap();
        sink.push_frame(FrameIndex(0), &FrameRgb::filled(1, 1, [0, 0, 0]))
            .unwrap();
        sink.begin(cfg).unwrap();
        assert!(sink.frames().is_empty());
        assert!(!sink.ended());
    }
}
