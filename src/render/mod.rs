//! Frame evaluation and painting.

/// Frame keys and the CPU painter.
pub mod frame;
