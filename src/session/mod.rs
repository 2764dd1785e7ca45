/// Clip rendering session (frames + audio into a sink).
pub mod render_session;
