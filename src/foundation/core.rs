use crate::foundation::error::{KeylayError, KeylayResult};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames), must be non-zero.
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> KeylayResult<Self> {
        if num == 0 {
            return Err(KeylayError::unsupported("Fps num must be > 0"));
        }
        if den == 0 {
            return Err(KeylayError::unsupported("Fps den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Number of output frames covering `secs` seconds, using ceiling
    /// semantics: a partial trailing frame still gets emitted.
    ///
    /// Subtracts a small epsilon before the ceiling to absorb binary float
    /// noise (`0.1 * 30` evaluates to `3.000...0004`, which must count as 3
    /// frames, not 4).
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let raw = secs * self.as_f64();
        if raw <= 0.0 {
            return 0;
        }
        ((raw - 1e-9).ceil().max(1.0)) as u64
    }
}

impl Default for Fps {
    /// 24 fps, the original application's output rate.
    fn default() -> Self {
        Self { num: 24, den: 1 }
    }
}

/// An RGB8 pixel.
pub type Rgb8 = [u8; 3];

/// A frame of tightly packed, row-major RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB8 bytes, `width * height * 3` long.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// Wrap raw RGB8 bytes, validating the buffer length.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> KeylayResult<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 {
            return Err(KeylayError::unsupported(
                "frame width/height must be non-zero",
            ));
        }
        if data.len() != expected {
            return Err(KeylayError::unsupported(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height} rgb24",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one solid color.
    pub fn filled(width: u32, height: u32, rgb: Rgb8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Read the pixel at `(x, y)`. Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        debug_assert!(x < self.width && y < self.height);
        let off = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[off], self.data[off + 1], self.data[off + 2]]
    }

    /// Write the pixel at `(x, y)`. Coordinates must be in bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: Rgb8) {
        debug_assert!(x < self.width && y < self.height);
        let off = (y as usize * self.width as usize + x as usize) * 3;
        self.data[off..off + 3].copy_from_slice(&rgb);
    }

    /// Return `true` when `other` has the same dimensions.
    pub fn same_size(&self, other: &FrameRgb) -> bool {
        self.width == other.width && self.height == other.height
    }
}
