/// Crate-wide result alias.
pub type KeylayResult<T> = Result<T, KeylayError>;

/// Errors reported by the compositor and its surrounding pipeline.
///
/// All failures are synchronous and all-or-nothing: no variant corresponds to
/// partially produced output.
#[derive(thiserror::Error, Debug)]
pub enum KeylayError {
    /// Target duration is zero, negative, or undeterminable.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Still image, overlay frame, and mask sizes disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Overlay clip contains no frames.
    #[error("empty overlay clip")]
    EmptyOverlay,

    /// Undecodable or malformed input (image, audio, or overlay bytes).
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Encoding or external tool failure (`ffmpeg`/`ffprobe`).
    #[error("encode error: {0}")]
    Encode(String),

    /// The caller cancelled the render between frames.
    #[error("render cancelled")]
    Cancelled,

    /// Any other error, preserved with its source chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KeylayError {
    /// Build an [`KeylayError::InvalidDuration`].
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build a [`KeylayError::DimensionMismatch`].
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Build an [`KeylayError::UnsupportedInput`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedInput(msg.into())
    }

    /// Build a [`KeylayError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
