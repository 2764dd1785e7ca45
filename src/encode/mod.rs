//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are fed by
//! [`crate::session::render_session::RenderSession::render_clip`].

/// `ffmpeg`-based sinks (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
