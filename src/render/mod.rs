/// Compositor session and options.
pub mod session;
