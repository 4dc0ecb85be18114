use crate::foundation::core::FrameRgb;
use crate::foundation::error::{KeylayError, KeylayResult};
use std::path::Path;

/// Decode a still image file (PNG, JPEG, ...) into an RGB8 frame.
pub fn decode_still_image(path: &Path) -> KeylayResult<FrameRgb> {
    let img = image::open(path).map_err(|e| {
        KeylayError::unsupported(format!("failed to decode image '{}': {e}", path.display()))
    })?;
    let rgb = img.to_rgb8();
    FrameRgb::new(rgb.width(), rgb.height(), rgb.into_raw())
}

/// Decode raw image bytes into an RGB8 frame.
pub fn decode_still_image_bytes(bytes: &[u8]) -> KeylayResult<FrameRgb> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| KeylayError::unsupported(format!("failed to decode image bytes: {e}")))?;
    let rgb = img.to_rgb8();
    FrameRgb::new(rgb.width(), rgb.height(), rgb.into_raw())
}

/// Crop at most one trailing row/column so both dimensions are even, as
/// required by yuv420p MP4 encoding.
///
/// Frames that are already even-sized are returned unchanged.
pub fn crop_to_even(frame: &FrameRgb) -> KeylayResult<FrameRgb> {
    let w = frame.width & !1;
    let h = frame.height & !1;
    if w == frame.width && h == frame.height {
        return Ok(frame.clone());
    }
    if w == 0 || h == 0 {
        return Err(KeylayError::unsupported(format!(
            "image {}x{} is too small to crop to even dimensions",
            frame.width, frame.height
        )));
    }

    let mut data = Vec::with_capacity(w as usize * h as usize * 3);
    for y in 0..h {
        let row = (y as usize * frame.width as usize) * 3;
        data.extend_from_slice(&frame.data[row..row + w as usize * 3]);
    }
    FrameRgb::new(w, h, data)
}
