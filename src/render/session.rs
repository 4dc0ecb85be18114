use crate::animation::ramp::scale_intro;
use crate::assets::media::validate_duration;
use crate::chroma::clip::OverlayClip;
use crate::chroma::compose::{compose_frame, scale_centered};
use crate::chroma::key::{KeyColor, MaskGrid, build_frame_mask};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRgb};
use crate::foundation::error::{KeylayError, KeylayResult};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Composition parameters, passed explicitly at call time (no process-wide
/// defaults).
#[derive(Clone, Debug)]
pub struct CompositorConfig {
    /// Key color and similarity radius used to mask the overlay.
    pub key: KeyColor,
    /// Output frame rate.
    pub fps: Fps,
    /// Intro scale-in ramp length in seconds. `None` keeps the still image
    /// at full size for the whole duration.
    pub intro_ramp_secs: Option<f64>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            key: KeyColor::default(),
            fps: Fps::default(),
            intro_ramp_secs: None,
        }
    }
}

/// Options controlling how a render executes.
#[derive(Clone, Debug, Default)]
pub struct CompositorOpts {
    /// Enable frame-level parallelism on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon
    /// defaults.
    pub threads: Option<usize>,
    /// Frames composed per chunk before delivery to the sink. 0 means one.
    pub chunk_size: usize,
    /// Cooperative cancellation flag, checked between frames. A set flag
    /// aborts the render with [`KeylayError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames produced and delivered to the sink.
    pub frames_total: u64,
    /// Distinct overlay masks computed (one per overlay frame in use).
    pub masks_built: u64,
}

const DEFAULT_CHUNK_SIZE: u64 = 64;

/// Chroma-key compositor.
///
/// A single-pass transform: for each output frame, mask the looped overlay
/// frame against the key color and select background or overlay per pixel.
/// Either the full frame sequence reaches the sink and `end` is called, or
/// the render fails atomically with the sink never finalized.
pub struct Compositor {
    cfg: CompositorConfig,
    opts: CompositorOpts,
}

impl Compositor {
    /// Create a compositor with default execution options.
    pub fn new(cfg: CompositorConfig) -> Self {
        Self::with_opts(cfg, CompositorOpts::default())
    }

    /// Create a compositor with explicit execution options.
    pub fn with_opts(cfg: CompositorConfig, opts: CompositorOpts) -> Self {
        Self { cfg, opts }
    }

    /// Borrow the composition parameters.
    pub fn config(&self) -> &CompositorConfig {
        &self.cfg
    }

    /// Compose the single output frame at `frame` without driving a sink.
    ///
    /// Applies the same masking, looping, and intro-scale policy as a full
    /// render.
    pub fn compose_at(
        &self,
        still: &FrameRgb,
        overlay: &OverlayClip,
        frame: FrameIndex,
    ) -> KeylayResult<FrameRgb> {
        self.check_sizes(still, overlay)?;
        let ov = overlay.frame_looped(frame.0);
        let mask = build_frame_mask(ov, &self.cfg.key);
        self.compose_with_mask(still, ov, &mask, frame.0)
    }

    /// Render the full composition into `sink`.
    ///
    /// Produces exactly `ceil(duration_secs * fps)` frames: overlay frame
    /// `i mod N` at output index `i`, so a short clip loops and a long clip
    /// is truncated, with no gaps and no silent frame drops. Frames reach
    /// the sink in strictly increasing index order regardless of worker
    /// completion order.
    pub fn render(
        &self,
        still: &FrameRgb,
        overlay: &OverlayClip,
        duration_secs: f64,
        sink: &mut dyn FrameSink,
    ) -> KeylayResult<RenderStats> {
        validate_duration(duration_secs)?;
        self.check_sizes(still, overlay)?;
        self.check_cancelled()?;

        let frames_total = self.cfg.fps.secs_to_frames_ceil(duration_secs);
        let overlay_frames = overlay.frame_count() as u64;
        debug!(
            frames_total,
            overlay_frames,
            fps = self.cfg.fps.as_f64(),
            "compositing"
        );

        // One mask per overlay frame in use; output frames reuse them as the
        // clip loops.
        let masks_used = overlay_frames.min(frames_total) as usize;
        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let masks = self.build_masks(overlay, masks_used, pool.as_ref());

        sink.begin(SinkConfig {
            width: still.width,
            height: still.height,
            fps: self.cfg.fps,
        })?;

        let chunk_size = if self.opts.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.opts.chunk_size as u64
        };

        let mut chunk_start = 0u64;
        while chunk_start < frames_total {
            self.check_cancelled()?;
            let chunk_end = (chunk_start + chunk_size).min(frames_total);

            if let Some(pool) = pool.as_ref() {
                // Rayon's indexed collect preserves frame order, so the
                // sequential push below satisfies the sink's ordering
                // contract.
                let composed: Vec<KeylayResult<FrameRgb>> = pool.install(|| {
                    (chunk_start..chunk_end)
                        .into_par_iter()
                        .map(|i| {
                            self.check_cancelled()?;
                            let ov = overlay.frame_looped(i);
                            let mask = &masks[(i % overlay_frames) as usize];
                            self.compose_with_mask(still, ov, mask, i)
                        })
                        .collect()
                });
                for (offset, composed) in composed.into_iter().enumerate() {
                    sink.push_frame(FrameIndex(chunk_start + offset as u64), &composed?)?;
                }
            } else {
                for i in chunk_start..chunk_end {
                    self.check_cancelled()?;
                    let ov = overlay.frame_looped(i);
                    let mask = &masks[(i % overlay_frames) as usize];
                    let frame = self.compose_with_mask(still, ov, mask, i)?;
                    sink.push_frame(FrameIndex(i), &frame)?;
                }
            }

            chunk_start = chunk_end;
        }

        sink.end()?;
        Ok(RenderStats {
            frames_total,
            masks_built: masks_used as u64,
        })
    }

    fn build_masks(
        &self,
        overlay: &OverlayClip,
        masks_used: usize,
        pool: Option<&rayon::ThreadPool>,
    ) -> Vec<MaskGrid> {
        let frames = &overlay.frames()[..masks_used];
        match pool {
            Some(pool) => pool.install(|| {
                frames
                    .par_iter()
                    .map(|f| build_frame_mask(f, &self.cfg.key))
                    .collect()
            }),
            None => frames
                .iter()
                .map(|f| build_frame_mask(f, &self.cfg.key))
                .collect(),
        }
    }

    fn compose_with_mask(
        &self,
        still: &FrameRgb,
        overlay_frame: &FrameRgb,
        mask: &MaskGrid,
        frame_index: u64,
    ) -> KeylayResult<FrameRgb> {
        match self.cfg.intro_ramp_secs {
            Some(ramp) if ramp > 0.0 => {
                let t = frame_index as f64 * self.cfg.fps.frame_duration_secs();
                let factor = scale_intro(t, ramp);
                if factor < 1.0 {
                    let background = scale_centered(still, factor);
                    return compose_frame(&background, overlay_frame, mask);
                }
                compose_frame(still, overlay_frame, mask)
            }
            _ => compose_frame(still, overlay_frame, mask),
        }
    }

    fn check_sizes(&self, still: &FrameRgb, overlay: &OverlayClip) -> KeylayResult<()> {
        if still.width != overlay.width() || still.height != overlay.height() {
            return Err(KeylayError::dimension_mismatch(format!(
                "still image is {}x{}, overlay clip is {}x{}",
                still.width,
                still.height,
                overlay.width(),
                overlay.height()
            )));
        }
        Ok(())
    }

    fn check_cancelled(&self) -> KeylayResult<()> {
        if let Some(flag) = self.opts.cancel.as_ref()
            && flag.load(Ordering::Relaxed)
        {
            return Err(KeylayError::Cancelled);
        }
        Ok(())
    }
}

fn build_thread_pool(threads: Option<usize>) -> KeylayResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(KeylayError::unsupported(
            "'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| KeylayError::encode(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::sink::InMemorySink;

    fn clip_of(colors: &[crate::Rgb8]) -> OverlayClip {
        OverlayClip::new(
            colors
                .iter()
                .map(|&c| FrameRgb::filled(1, 1, c))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn zero_duration_fails_before_any_frame() {
        let comp = Compositor::new(CompositorConfig::default());
        let still = FrameRgb::filled(1, 1, [10, 200, 10]);
        let overlay = clip_of(&[[0, 255, 0]]);
        let mut sink = InMemorySink::new();
        let err = comp.render(&still, &overlay, 0.0, &mut sink).unwrap_err();
        assert!(matches!(err, KeylayError::InvalidDuration(_)));
        assert!(sink.frames().is_empty());
        assert!(sink.config().is_none());
    }

    #[test]
    fn size_disagreement_fails_before_any_frame() {
        let comp = Compositor::new(CompositorConfig::default());
        let still = FrameRgb::filled(2, 2, [0, 0, 0]);
        let overlay = clip_of(&[[0, 255, 0]]);
        let mut sink = InMemorySink::new();
        let err = comp.render(&still, &overlay, 1.0, &mut sink).unwrap_err();
        assert!(matches!(err, KeylayError::DimensionMismatch(_)));
        assert!(sink.config().is_none());
    }

    #[test]
    fn preset_cancel_flag_aborts_with_no_frames() {
        let cancel = Arc::new(AtomicBool::new(true));
        let comp = Compositor::with_opts(
            CompositorConfig::default(),
            CompositorOpts {
                cancel: Some(cancel),
                ..CompositorOpts::default()
            },
        );
        let still = FrameRgb::filled(1, 1, [10, 200, 10]);
        let overlay = clip_of(&[[0, 255, 0]]);
        let mut sink = InMemorySink::new();
        let err = comp.render(&still, &overlay, 1.0, &mut sink).unwrap_err();
        assert!(matches!(err, KeylayError::Cancelled));
        assert!(sink.frames().is_empty());
        assert!(!sink.ended());
    }

    #[test]
    fn compose_at_matches_full_render() {
        let comp = Compositor::new(CompositorConfig {
            intro_ramp_secs: Some(0.25),
            ..CompositorConfig::default()
        });
        let still = FrameRgb::filled(2, 2, [10, 200, 10]);
        let overlay = OverlayClip::new(vec![
            FrameRgb::filled(2, 2, [0, 255, 0]),
            FrameRgb::filled(2, 2, [200, 0, 200]),
        ])
        .unwrap();

        let mut sink = InMemorySink::new();
        comp.render(&still, &overlay, 0.5, &mut sink).unwrap();
        for (idx, frame) in sink.frames() {
            assert_eq!(&comp.compose_at(&still, &overlay, *idx).unwrap(), frame);
        }
    }

    #[test]
    fn intro_ramp_starts_black_and_reaches_full_size() {
        let comp = Compositor::new(CompositorConfig {
            key: KeyColor::default(),
            fps: Fps::new(4, 1).unwrap(),
            intro_ramp_secs: Some(1.0),
        });
        let still = FrameRgb::filled(2, 2, [100, 100, 100]);
        // Solid key overlay: output is exactly the (scaled) background.
        let overlay = OverlayClip::new(vec![FrameRgb::filled(2, 2, [0, 255, 0])]).unwrap();

        let mut sink = InMemorySink::new();
        comp.render(&still, &overlay, 2.0, &mut sink).unwrap();
        let frames = sink.frames();
        // Frame 0 is t=0: factor 0, all black.
        assert_eq!(frames[0].1, FrameRgb::filled(2, 2, [0, 0, 0]));
        // Frame 4 is t=1.0: factor 1, full-size still.
        assert_eq!(frames[4].1, still);
        // And it holds afterwards.
        assert_eq!(frames[7].1, still);
    }
}
