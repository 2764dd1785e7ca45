//! pixelcross generates short synthetic clips and publishes them on a schedule.
//!
//! Each clip reveals randomly placed colored pixels one at a time over a random background,
//! then ends with full-frame color flashes. Every step is accompanied by a sine beep. Clips are
//! encoded with the system `ffmpeg` and handed to an [`upload::Uploader`].
//!
//! - Draw a [`ClipPlan`] from a seeded RNG
//! - Render it through a [`RenderSession`] into a [`FrameSink`]
//! - Or let a [`Runner`] loop over generate, upload, clean up and sleep
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Beep synthesis.
pub mod audio;
/// Run and clip configuration.
pub mod config;
/// Encoding sinks.
pub mod encode;
mod foundation;
/// Log subscriber setup.
pub mod logging;
/// Per-clip random draws.
pub mod plan;
/// Frame painting.
pub mod render;
/// The clip loop.
pub mod runner;
/// Clip rendering sessions.
pub mod session;
/// Title generation.
pub mod title;
/// Upload targets.
pub mod upload;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgb8};
pub use crate::foundation::error::{PixelcrossError, PixelcrossResult};

pub use crate::config::{ClipParams, LogConfig, RunConfig, UploadConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::plan::{ClipPlan, Pixel, Tone};
pub use crate::render::frame::{FrameKey, FrameRGBA};
pub use crate::runner::{ClipWriter, FfmpegClipWriter, IterationOutcome, RunSummary, Runner};
pub use crate::session::render_session::{RenderOpts, RenderSession, RenderStats};
pub use crate::title::random_title;
pub use crate::upload::{UploadReceipt, Uploader, VideoMeta, uploader_from_config};
