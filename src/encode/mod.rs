/// MP4 encoding through a spawned `ffmpeg` process.
pub mod ffmpeg;
/// Frame sink contract and in-memory sink.
pub mod sink;
