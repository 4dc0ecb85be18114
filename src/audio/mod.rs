/// PCM decoding and background-track handling.
pub mod track;
