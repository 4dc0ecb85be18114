use crate::chroma::key::MaskGrid;
use crate::foundation::core::FrameRgb;
use crate::foundation::error::{KeylayError, KeylayResult};

/// Combine one background and one overlay frame through a mask.
///
/// For each position: background pixel where the mask is `true`, overlay
/// pixel otherwise. All three inputs must share the same dimensions;
/// disagreement is a fatal precondition violation, never a silent crop or
/// stretch.
pub fn compose_frame(
    background: &FrameRgb,
    overlay: &FrameRgb,
    mask: &MaskGrid,
) -> KeylayResult<FrameRgb> {
    if !background.same_size(overlay) {
        return Err(KeylayError::dimension_mismatch(format!(
            "background is {}x{}, overlay is {}x{}",
            background.width, background.height, overlay.width, overlay.height
        )));
    }
    if mask.width != background.width || mask.height != background.height {
        return Err(KeylayError::dimension_mismatch(format!(
            "mask is {}x{}, frames are {}x{}",
            mask.width, mask.height, background.width, background.height
        )));
    }

    let mut data = vec![0u8; background.data.len()];
    for ((out, &keyed), (bg, ov)) in data
        .chunks_exact_mut(3)
        .zip(mask.data.iter())
        .zip(background.data.chunks_exact(3).zip(overlay.data.chunks_exact(3)))
    {
        out.copy_from_slice(if keyed { bg } else { ov });
    }

    Ok(FrameRgb {
        width: background.width,
        height: background.height,
        data,
    })
}

/// Scale `src` by `factor` about its center onto a black canvas of the same
/// size, nearest-neighbor.
///
/// Factor 0 yields an all-black frame; factor 1 is an exact copy. Used for
/// the intro scale-in effect.
pub fn scale_centered(src: &FrameRgb, factor: f64) -> FrameRgb {
    let factor = factor.clamp(0.0, 1.0);
    if factor >= 1.0 {
        return src.clone();
    }

    let mut out = FrameRgb::filled(src.width, src.height, [0, 0, 0]);
    let sw = (f64::from(src.width) * factor).round() as u32;
    let sh = (f64::from(src.height) * factor).round() as u32;
    if sw == 0 || sh == 0 {
        return out;
    }

    let x0 = (src.width - sw) / 2;
    let y0 = (src.height - sh) / 2;
    for y in 0..sh {
        let sy = ((u64::from(y) * u64::from(src.height)) / u64::from(sh)) as u32;
        for x in 0..sw {
            let sx = ((u64::from(x) * u64::from(src.width)) / u64::from(sw)) as u32;
            out.set_pixel(x0 + x, y0 + y, src.pixel(sx, sy));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chroma::key::{KeyColor, build_frame_mask};

    fn checker() -> FrameRgb {
        let mut f = FrameRgb::filled(2, 2, [10, 20, 30]);
        f.set_pixel(1, 1, [200, 210, 220]);
        f
    }

    #[test]
    fn all_false_mask_returns_overlay_exactly() {
        let bg = checker();
        let ov = FrameRgb::filled(2, 2, [1, 2, 3]);
        let mask = build_frame_mask(&ov, &KeyColor::with_tolerance([255, 255, 255], 0));
        assert!(mask.is_all_false());
        let out = compose_frame(&bg, &ov, &mask).unwrap();
        assert_eq!(out, ov);
    }

    #[test]
    fn all_true_mask_returns_background_exactly() {
        let bg = checker();
        let ov = FrameRgb::filled(2, 2, [1, 2, 3]);
        let mask = build_frame_mask(&ov, &KeyColor::with_tolerance([0, 0, 0], 255));
        assert!(mask.is_all_true());
        let out = compose_frame(&bg, &ov, &mask).unwrap();
        assert_eq!(out, bg);
    }

    #[test]
    fn mixed_mask_selects_per_position() {
        let bg = FrameRgb::filled(2, 1, [9, 9, 9]);
        let mut ov = FrameRgb::filled(2, 1, [0, 255, 0]);
        ov.set_pixel(1, 0, [50, 50, 50]);
        let mask = build_frame_mask(&ov, &KeyColor::default());
        let out = compose_frame(&bg, &ov, &mask).unwrap();
        assert_eq!(out.pixel(0, 0), [9, 9, 9]);
        assert_eq!(out.pixel(1, 0), [50, 50, 50]);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let bg = FrameRgb::filled(2, 2, [0, 0, 0]);
        let ov = FrameRgb::filled(3, 2, [0, 0, 0]);
        let mask = build_frame_mask(&ov, &KeyColor::default());
        let err = compose_frame(&bg, &ov, &mask).unwrap_err();
        assert!(matches!(err, crate::KeylayError::DimensionMismatch(_)));

        let mask_small = build_frame_mask(&FrameRgb::filled(1, 1, [0, 0, 0]), &KeyColor::default());
        let err = compose_frame(&bg, &bg, &mask_small).unwrap_err();
        assert!(matches!(err, crate::KeylayError::DimensionMismatch(_)));
    }

    #[test]
    fn scale_factor_1_is_identity() {
        let src = checker();
        assert_eq!(scale_centered(&src, 1.0), src);
    }

    #[test]
    fn scale_factor_0_is_black() {
        let src = checker();
        let out = scale_centered(&src, 0.0);
        assert_eq!(out, FrameRgb::filled(2, 2, [0, 0, 0]));
    }

    #[test]
    fn scale_half_centers_the_image() {
        let src = FrameRgb::filled(4, 4, [100, 100, 100]);
        let out = scale_centered(&src, 0.5);
        // 2x2 center is source pixels, 1px black border all around.
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(3, 3), [0, 0, 0]);
        assert_eq!(out.pixel(1, 1), [100, 100, 100]);
        assert_eq!(out.pixel(2, 2), [100, 100, 100]);
    }
}
