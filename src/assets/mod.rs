/// Still image decoding.
pub mod image;
/// Media probing and overlay clip decoding through `ffprobe`/`ffmpeg`.
pub mod media;
