//! The generate → encode → upload → clean up → sleep loop.

use crate::config::RunConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::plan::ClipPlan;
use crate::session::render_session::{RenderOpts, RenderSession, RenderStats};
use crate::title::random_title;
use crate::upload::{UploadReceipt, Uploader, VideoMeta};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::time::{Duration, Instant};

/// Writes a planned clip to a media file.
pub trait ClipWriter {
    /// Render `plan` into `out`.
    fn write_clip(&mut self, plan: &ClipPlan, out: &Path) -> PixelcrossResult<RenderStats>;
}

/// Production writer: renders through [`RenderSession`] into an `ffmpeg` MP4 sink.
///
/// The beep track is always rendered, whatever `opts.enable_audio` says.
#[derive(Clone, Debug, Default)]
pub struct FfmpegClipWriter {
    /// Render options used for every clip.
    pub opts: RenderOpts,
}

impl ClipWriter for FfmpegClipWriter {
    fn write_clip(&mut self, plan: &ClipPlan, out: &Path) -> PixelcrossResult<RenderStats> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
        let opts = RenderOpts {
            enable_audio: true,
            ..self.opts.clone()
        };
        RenderSession::new(plan, opts).render_clip(&mut sink)
    }
}

/// Counters for a finished (or interrupted) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations started.
    pub attempted: u64,
    /// Clips successfully written.
    pub generated: u64,
    /// Clips successfully uploaded.
    pub uploaded: u64,
    /// Iterations where generation or upload failed.
    pub failed: u64,
}

/// Result of a single iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Clip generated and handed to the uploader.
    Uploaded(UploadReceipt),
    /// Clip could not be generated; nothing was uploaded.
    GenerateFailed,
    /// Clip was generated but the upload failed.
    UploadFailed,
}

/// Time left to sleep so that iterations start `interval` apart.
pub fn remaining_interval(interval: Duration, elapsed: Duration) -> Option<Duration> {
    interval.checked_sub(elapsed).filter(|d| !d.is_zero())
}

/// Drives the clip loop.
pub struct Runner<W: ClipWriter> {
    cfg: RunConfig,
    writer: W,
    uploader: Box<dyn Uploader>,
}

impl<W: ClipWriter> Runner<W> {
    /// Validate `cfg` and assemble a runner.
    pub fn new(cfg: RunConfig, writer: W, uploader: Box<dyn Uploader>) -> PixelcrossResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            writer,
            uploader,
        })
    }

    /// Run every configured iteration (forever when `count` is `None`).
    ///
    /// Per-iteration failures are logged and counted, never returned. The only errors returned
    /// are setup failures such as an uncreatable work directory.
    pub fn run(&mut self) -> PixelcrossResult<RunSummary> {
        std::fs::create_dir_all(&self.cfg.work_dir).map_err(|e| {
            PixelcrossError::config(format!(
                "cannot create work dir '{}': {e}",
                self.cfg.work_dir.display()
            ))
        })?;

        let interval = self.cfg.interval()?;
        let iterations: Box<dyn Iterator<Item = u64>> = match self.cfg.count {
            Some(n) => Box::new(0..n),
            None => Box::new(0..),
        };

        let mut summary = RunSummary::default();
        for i in iterations {
            let started = Instant::now();
            summary.attempted += 1;
            match self.run_once(i) {
                IterationOutcome::Uploaded(_) => {
                    summary.generated += 1;
                    summary.uploaded += 1;
                }
                IterationOutcome::UploadFailed => {
                    summary.generated += 1;
                    summary.failed += 1;
                }
                IterationOutcome::GenerateFailed => summary.failed += 1,
            }

            let last = self.cfg.count.is_some_and(|n| i + 1 >= n);
            if !last && let Some(rest) = remaining_interval(interval, started.elapsed()) {
                tracing::debug!(secs = rest.as_secs_f64(), "sleeping until next clip");
                std::thread::sleep(rest);
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            generated = summary.generated,
            uploaded = summary.uploaded,
            failed = summary.failed,
            "run finished"
        );
        Ok(summary)
    }

    /// Generate, upload and clean up clip `i` (0-based).
    pub fn run_once(&mut self, i: u64) -> IterationOutcome {
        let total = self
            .cfg
            .count
            .map_or_else(|| "∞".to_owned(), |n| n.to_string());
        tracing::info!("starting clip {} of {}", i + 1, total);

        let mut rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i)),
            None => StdRng::from_os_rng(),
        };
        let title = random_title(&mut rng, self.cfg.clip.title_blocks);
        let meta = VideoMeta::titled(title);
        let path = self.cfg.clip_path(i);

        let generated = ClipPlan::generate(&self.cfg.clip, &mut rng)
            .and_then(|plan| self.writer.write_clip(&plan, &path));
        match generated {
            Ok(stats) => {
                tracing::info!(
                    file = %path.display(),
                    frames = stats.frames_total,
                    "generated clip"
                );
            }
            Err(e) => {
                tracing::error!(file = %path.display(), "clip generation failed: {e}");
                remove_clip(&path);
                return IterationOutcome::GenerateFailed;
            }
        }

        let outcome = match self.uploader.upload(&path, &meta) {
            Ok(receipt) => {
                match receipt.video_id.as_deref() {
                    Some(id) => tracing::info!(video_id = id, title = %meta.title, "uploaded"),
                    None => tracing::info!(title = %meta.title, "upload finished"),
                }
                IterationOutcome::Uploaded(receipt)
            }
            Err(e) => {
                tracing::warn!(title = %meta.title, "upload failed: {e}");
                IterationOutcome::UploadFailed
            }
        };

        if !self.cfg.keep_files {
            remove_clip(&path);
        }
        outcome
    }
}

fn remove_clip(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(file = %path.display(), "removed clip"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(file = %path.display(), "failed to remove clip: {e}"),
    }
}

#[cfg(test)]
#[path = "../tests/unit/runner.rs"]
mod tests;
