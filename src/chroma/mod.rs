/// Overlay clip container with loop-or-truncate frame addressing.
pub mod clip;
/// Per-frame composition of background and overlay through a mask.
pub mod compose;
/// Key color classification and mask construction.
pub mod key;
