use crate::audio::MIX_CHANNELS;
use crate::audio::tone::{sample_span, synthesize, write_f32le};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::plan::ClipPlan;
use crate::render::frame::{FrameKey, FrameRGBA, frame_key, paint_frame};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

static NEXT_AUDIO_ID: AtomicU64 = AtomicU64::new(0);

/// Options controlling how a clip is rendered and streamed.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Chunk size used by the render->encode streaming pipeline.
    pub chunk_size: usize,
    /// Reuse the payload of an identical earlier frame within a chunk instead of repainting it.
    pub static_frame_elision: bool,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,
    /// Synthesize the beep track and hand it to the sink.
    pub enable_audio: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
            static_frame_elision: true,
            channel_capacity: 4,
            enable_audio: true,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames actually painted (may be < total when static-frame elision is enabled).
    pub frames_rendered: u64,
    /// Frames elided due to static-frame elision.
    pub frames_elided: u64,
}

impl RenderStats {
    fn add(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Renders a [`ClipPlan`] into frame sinks.
pub struct RenderSession<'a> {
    plan: &'a ClipPlan,
    opts: RenderOpts,
}

impl<'a> RenderSession<'a> {
    /// Construct a session over `plan`.
    pub fn new(plan: &'a ClipPlan, opts: RenderOpts) -> Self {
        Self { plan, opts }
    }

    /// Full clip range.
    pub fn clip_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.plan.duration_frames()),
        }
    }

    /// Render a single frame.
    pub fn render_frame(&self, frame: FrameIndex) -> PixelcrossResult<FrameRGBA> {
        let key = frame_key(self.plan, frame)?;
        Ok(paint_frame(self.plan, key))
    }

    /// Render the whole clip (video and, if enabled, audio) into `sink`.
    pub fn render_clip(&self, sink: &mut dyn FrameSink) -> PixelcrossResult<RenderStats> {
        self.render_range(self.clip_range(), sink)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, out-of-order worker completion is reordered at the sink boundary (bounded channel
    /// backpressure). With audio enabled, the sink's track starts at `range.start` and spans
    /// the same time as the rendered frames.
    #[tracing::instrument(skip(self, sink), fields(frames = range.len_frames()))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> PixelcrossResult<RenderStats> {
        if range.is_empty() {
            return Err(PixelcrossError::validation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.plan.duration_frames() {
            return Err(PixelcrossError::validation(
                "render_range range must be within clip duration",
            ));
        }

        let mut audio_tmp = TempFileGuard(None);
        let audio_cfg = if self.opts.enable_audio {
            let sample_rate = self.plan.params.sample_rate;
            let pcm = synthesize(self.plan, sample_rate, MIX_CHANNELS)?;
            let span = sample_span(self.plan, sample_rate, range);
            let ch = usize::from(MIX_CHANNELS);
            let path = std::env::temp_dir().join(format!(
                "pixelcross_tones_{}_{}.f32le",
                std::process::id(),
                NEXT_AUDIO_ID.fetch_add(1, Ordering::Relaxed),
            ));
            audio_tmp.0 = Some(path.clone());
            write_f32le(&pcm[span.start * ch..span.end * ch], &path)?;
            Some(AudioInputConfig {
                path,
                sample_rate,
                channels: MIX_CHANNELS,
            })
        } else {
            None
        };

        let canvas = self.plan.params.canvas;
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.plan.params.fps,
            audio: audio_cfg,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = canvas.area().saturating_mul(4).max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = (self.opts.chunk_size.max(1) as u64)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        // Encoder thread: enforce in-order delivery to the sink regardless of render completion
        // order.
        let result = std::thread::scope(|scope| -> PixelcrossResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> PixelcrossResult<()> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, Arc<FrameRGBA>>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                        continue;
                    }

                    let msg = rx.recv().map_err(|_| {
                        PixelcrossError::render("encoder channel disconnected unexpectedly")
                    })?;
                    pending.insert(msg.idx, msg.frame);
                }

                sink_ref.end()
            });

            let mut stats = RenderStats::default();
            let mut produce_res: Result<(), Produce> = Ok(());
            let mut chunk_start = range_start;
            while chunk_start < range_end {
                let chunk_end = (chunk_start + chunk_size).min(range_end);
                let chunk = match pool.as_ref() {
                    Some(pool) => self.render_chunk_parallel(pool, chunk_start, chunk_end, &tx),
                    None => self.render_chunk_sequential(chunk_start, chunk_end, &tx),
                };
                match chunk {
                    Ok(chunk_stats) => stats.add(chunk_stats),
                    Err(e) => {
                        produce_res = Err(e);
                        break;
                    }
                }
                chunk_start = chunk_end;
            }

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| PixelcrossError::render("encoder thread panicked"))?;

            match (produce_res, enc_res) {
                (Ok(()), Ok(())) => Ok(stats),
                (Ok(()), Err(e)) => Err(e),
                // The sink failed first and hung up on the producer.
                (Err(Produce::Disconnected), Err(e)) => Err(e),
                (Err(Produce::Disconnected), Ok(())) => Err(PixelcrossError::render(
                    "encoder thread is not accepting frames",
                )),
                (Err(Produce::Failed(e)), _) => Err(e),
            }
        });

        drop(audio_tmp);
        let stats = result?;
        tracing::debug!(
            rendered = stats.frames_rendered,
            elided = stats.frames_elided,
            "clip rendered"
        );
        Ok(stats)
    }

    fn chunk_keys(&self, start: u64, end: u64) -> Result<Vec<FrameKey>, Produce> {
        (start..end)
            .map(|f| frame_key(self.plan, FrameIndex(f)).map_err(Produce::Failed))
            .collect()
    }

    fn render_chunk_sequential(
        &self,
        start: u64,
        end: u64,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> Result<RenderStats, Produce> {
        let keys = self.chunk_keys(start, end)?;
        let mut stats = RenderStats {
            frames_total: end - start,
            ..RenderStats::default()
        };
        let mut cache = HashMap::<FrameKey, Arc<FrameRGBA>>::new();
        for (f, key) in (start..end).zip(keys) {
            let frame = match cache.get(&key) {
                Some(frame) if self.opts.static_frame_elision => {
                    stats.frames_elided += 1;
                    frame.clone()
                }
                _ => {
                    let frame = Arc::new(paint_frame(self.plan, key));
                    stats.frames_rendered += 1;
                    if self.opts.static_frame_elision {
                        cache.insert(key, frame.clone());
                    }
                    frame
                }
            };
            send(tx, f, frame)?;
        }
        Ok(stats)
    }

    fn render_chunk_parallel(
        &self,
        pool: &rayon::ThreadPool,
        start: u64,
        end: u64,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> Result<RenderStats, Produce> {
        let keys = self.chunk_keys(start, end)?;
        let total = end - start;

        if !self.opts.static_frame_elision {
            let plan = self.plan;
            pool.install(|| {
                keys.par_iter().enumerate().try_for_each_with(
                    tx.clone(),
                    |tx, (i, &key)| -> Result<(), Produce> {
                        let frame = Arc::new(paint_frame(plan, key));
                        send(tx, start + i as u64, frame)
                    },
                )
            })?;
            return Ok(RenderStats {
                frames_total: total,
                frames_rendered: total,
                frames_elided: 0,
            });
        }

        let mut uniq = Vec::<FrameKey>::new();
        let mut map = Vec::<usize>::with_capacity(keys.len());
        let mut seen = HashMap::<FrameKey, usize>::new();
        for &key in &keys {
            let u = *seen.entry(key).or_insert_with(|| {
                uniq.push(key);
                uniq.len() - 1
            });
            map.push(u);
        }

        let plan = self.plan;
        let unique_frames: Vec<Arc<FrameRGBA>> = pool.install(|| {
            uniq.par_iter()
                .map(|&key| Arc::new(paint_frame(plan, key)))
                .collect()
        });

        for (i, &u) in map.iter().enumerate() {
            send(tx, start + i as u64, unique_frames[u].clone())?;
        }

        let rendered = unique_frames.len() as u64;
        Ok(RenderStats {
            frames_total: total,
            frames_rendered: rendered,
            frames_elided: total - rendered,
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: u64,
    frame: Arc<FrameRGBA>,
}

#[derive(Debug)]
enum Produce {
    Failed(PixelcrossError),
    Disconnected,
}

fn send(tx: &mpsc::SyncSender<FrameMsg>, idx: u64, frame: Arc<FrameRGBA>) -> Result<(), Produce> {
    tx.send(FrameMsg { idx, frame })
        .map_err(|_| Produce::Disconnected)
}

fn build_thread_pool(threads: Option<usize>) -> PixelcrossResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PixelcrossError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PixelcrossError::render(format!("failed to build rayon thread pool: {e}")))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
