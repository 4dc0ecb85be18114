use crate::foundation::core::FrameRgb;
use crate::foundation::error::{KeylayError, KeylayResult};

/// A finite, non-empty sequence of uniform-size overlay frames.
///
/// When the output timeline needs more frames than the clip holds, the clip
/// loops from the start; when it needs fewer, the tail is truncated. Both
/// behaviors fall out of [`OverlayClip::frame_looped`] indexing.
#[derive(Clone, Debug)]
pub struct OverlayClip {
    frames: Vec<FrameRgb>,
}

impl OverlayClip {
    /// Wrap decoded frames, rejecting empty clips and mixed frame sizes.
    pub fn new(frames: Vec<FrameRgb>) -> KeylayResult<Self> {
        let Some(first) = frames.first() else {
            return Err(KeylayError::EmptyOverlay);
        };
        let (w, h) = (first.width, first.height);
        if let Some(bad) = frames.iter().find(|f| !f.same_size(first)) {
            return Err(KeylayError::dimension_mismatch(format!(
                "overlay frames disagree in size: {}x{} vs {}x{}",
                w, h, bad.width, bad.height
            )));
        }
        Ok(Self { frames })
    }

    /// Number of frames in the clip (always >= 1).
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.frames[0].width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.frames[0].height
    }

    /// Borrow the clip frame for output index `i`, looping past the end.
    pub fn frame_looped(&self, i: u64) -> &FrameRgb {
        &self.frames[(i % self.frames.len() as u64) as usize]
    }

    /// Borrow the underlying frames in order.
    pub fn frames(&self) -> &[FrameRgb] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clip_is_rejected() {
        let err = OverlayClip::new(Vec::new()).unwrap_err();
        assert!(matches!(err, KeylayError::EmptyOverlay));
    }

    #[test]
    fn mixed_sizes_are_rejected() {
        let frames = vec![
            FrameRgb::filled(2, 2, [0, 0, 0]),
            FrameRgb::filled(2, 3, [0, 0, 0]),
        ];
        let err = OverlayClip::new(frames).unwrap_err();
        assert!(matches!(err, KeylayError::DimensionMismatch(_)));
    }

    #[test]
    fn looped_indexing_wraps() {
        let frames = vec![
            FrameRgb::filled(1, 1, [1, 0, 0]),
            FrameRgb::filled(1, 1, [2, 0, 0]),
            FrameRgb::filled(1, 1, [3, 0, 0]),
        ];
        let clip = OverlayClip::new(frames).unwrap();
        assert_eq!(clip.frame_looped(0).pixel(0, 0)[0], 1);
        assert_eq!(clip.frame_looped(2).pixel(0, 0)[0], 3);
        assert_eq!(clip.frame_looped(3).pixel(0, 0)[0], 1);
        assert_eq!(clip.frame_looped(7).pixel(0, 0)[0], 2);
    }
}
