use crate::foundation::core::{FrameRgb, Rgb8};

/// Reference key color plus a per-channel similarity radius.
///
/// A pixel is classified as "key" (transparent, show the background) when
/// every channel's absolute difference from `rgb` is within `tolerance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeyColor {
    /// Reference color to key out.
    pub rgb: Rgb8,
    /// Per-channel similarity radius. 0 keys only exact matches; 255 keys
    /// every pixel.
    pub tolerance: u8,
}

impl Default for KeyColor {
    /// Pure green with tolerance 100.
    fn default() -> Self {
        Self {
            rgb: [0, 255, 0],
            tolerance: 100,
        }
    }
}

impl KeyColor {
    /// Key color with the default tolerance.
    pub fn new(rgb: Rgb8) -> Self {
        Self {
            rgb,
            ..Self::default()
        }
    }

    /// Key color with an explicit tolerance.
    pub fn with_tolerance(rgb: Rgb8, tolerance: u8) -> Self {
        Self { rgb, tolerance }
    }
}

/// Classify one pixel against the key color.
///
/// Pure and deterministic; applied identically to every pixel of every
/// overlay frame. The comparison is inclusive so the boundary behavior is
/// exact: tolerance 0 keys only pixels equal to the key color, tolerance 255
/// keys everything.
pub fn classify_key_pixel(pixel: Rgb8, key: &KeyColor) -> bool {
    pixel
        .iter()
        .zip(key.rgb.iter())
        .all(|(&p, &k)| p.abs_diff(k) <= key.tolerance)
}

/// Boolean mask over one frame: `true` means "keyed out, show background".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskGrid {
    /// Width in pixels, matches the source frame.
    pub width: u32,
    /// Height in pixels, matches the source frame.
    pub height: u32,
    /// Row-major classification results, `width * height` long.
    pub data: Vec<bool>,
}

impl MaskGrid {
    /// Return `true` when every position is keyed.
    pub fn is_all_true(&self) -> bool {
        self.data.iter().all(|&m| m)
    }

    /// Return `true` when no position is keyed.
    pub fn is_all_false(&self) -> bool {
        self.data.iter().all(|&m| !m)
    }
}

/// Apply [`classify_key_pixel`] to every pixel of one overlay frame.
///
/// The result is always resolution-matched to `frame`; resizing happens
/// upstream of masking, never here.
pub fn build_frame_mask(frame: &FrameRgb, key: &KeyColor) -> MaskGrid {
    let mut data = Vec::with_capacity(frame.pixel_count());
    for px in frame.data.chunks_exact(3) {
        data.push(classify_key_pixel([px[0], px[1], px[2]], key));
    }
    MaskGrid {
        width: frame.width,
        height: frame.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_0_keys_only_exact_matches() {
        let key = KeyColor::with_tolerance([0, 255, 0], 0);
        assert!(classify_key_pixel([0, 255, 0], &key));
        assert!(!classify_key_pixel([0, 254, 0], &key));
        assert!(!classify_key_pixel([1, 255, 0], &key));
    }

    #[test]
    fn tolerance_255_keys_everything() {
        let key = KeyColor::with_tolerance([0, 255, 0], 255);
        assert!(classify_key_pixel([0, 255, 0], &key));
        assert!(classify_key_pixel([255, 0, 255], &key));
        assert!(classify_key_pixel([128, 128, 128], &key));
    }

    #[test]
    fn every_channel_must_be_within_tolerance() {
        let key = KeyColor::with_tolerance([0, 255, 0], 100);
        // (10, 200, 10): diffs (10, 55, 10), all within 100.
        assert!(classify_key_pixel([10, 200, 10], &key));
        // Red channel diff 150 exceeds the radius even though the rest match.
        assert!(!classify_key_pixel([150, 255, 0], &key));
    }

    #[test]
    fn mask_of_solid_key_frame_is_all_true() {
        let key = KeyColor::default();
        let frame = FrameRgb::filled(4, 3, [0, 255, 0]);
        let mask = build_frame_mask(&frame, &key);
        assert_eq!((mask.width, mask.height), (4, 3));
        assert!(mask.is_all_true());
    }

    #[test]
    fn mask_of_far_frame_is_all_false() {
        let key = KeyColor::default();
        let frame = FrameRgb::filled(4, 3, [255, 0, 255]);
        assert!(build_frame_mask(&frame, &key).is_all_false());
    }

    #[test]
    fn mask_is_positionally_accurate() {
        let key = KeyColor::with_tolerance([0, 255, 0], 10);
        let mut frame = FrameRgb::filled(2, 2, [255, 0, 255]);
        frame.set_pixel(1, 0, [0, 250, 5]);
        let mask = build_frame_mask(&frame, &key);
        assert_eq!(mask.data, vec![false, true, false, false]);
    }
}
