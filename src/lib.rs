//! Keylay composites a still image under a chroma-keyed greenscreen overlay
//! clip for the duration of an audio track.
//!
//! The core is a pure, single-pass transform:
//!
//! - Classify overlay pixels against a [`KeyColor`] ([`classify_key_pixel`],
//!   [`build_frame_mask`])
//! - Select background or overlay per pixel ([`compose_frame`])
//! - Orchestrate frame-exact output with loop-or-truncate overlay indexing
//!   ([`Compositor`])
//!
//! Frames stream into a [`FrameSink`]; [`FfmpegSink`] encodes MP4 through a
//! spawned `ffmpeg`, and [`pipeline::compose_to_mp4`] runs the whole
//! audio-probe/decode/render/encode flow end to end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Time-based animation policies (intro scale ramp).
pub mod animation;
/// Still image and overlay clip decoding.
pub mod assets;
/// Audio decoding and background-track handling.
pub mod audio;
/// Chroma-key classification, masking, and per-frame composition.
pub mod chroma;
/// Frame sinks and MP4 encoding.
pub mod encode;
/// End-to-end compose pipeline (probe, decode, render, encode).
pub mod pipeline;
/// Composition orchestration.
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRgb, Rgb8};
pub use crate::foundation::error::{KeylayError, KeylayResult};

pub use crate::animation::ramp::scale_intro;
pub use crate::chroma::clip::OverlayClip;
pub use crate::chroma::compose::compose_frame;
pub use crate::chroma::key::{KeyColor, MaskGrid, build_frame_mask, classify_key_pixel};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::{ComposeRequest, compose_to_mp4};
pub use crate::render::session::{Compositor, CompositorConfig, CompositorOpts, RenderStats};
