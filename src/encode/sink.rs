use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::render::frame::FrameRGBA;
use std::path::PathBuf;

/// Clip format announced to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Clip frame rate.
    pub fps: Fps,
    /// Beep track, absent when the session renders video only.
    pub audio: Option<AudioInputConfig>,
}

impl SinkConfig {
    /// Byte length of one RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Location and layout of a rendered beep track.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Raw interleaved `f32le` file. It only lives for the duration of the render.
    pub path: PathBuf,
    /// Samples per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

/// Consumer of a clip's frames.
///
/// A session calls `begin` once, then `push_frame` with strictly increasing indices, then `end`.
/// The audio file named in `begin` is deleted once the session returns, so sinks must open or
/// copy it before `end` returns.
pub trait FrameSink: Send {
    /// Prepare for a clip in the given format.
    fn begin(&mut self, cfg: SinkConfig) -> PixelcrossResult<()>;
    /// Accept the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PixelcrossResult<()>;
    /// Flush after the last frame.
    fn end(&mut self) -> PixelcrossResult<()>;
}

/// Keeps every frame and the beep track in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    audio: Option<Vec<u8>>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Format passed to the last `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Frames received since the last `begin`.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// The beep track as raw `f32le` bytes, copied during `begin`.
    pub fn audio_bytes(&self) -> Option<&[u8]> {
        self.audio.as_deref()
    }

    /// `true` once `end` has been called for the current clip.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PixelcrossResult<()> {
        self.audio = cfg
            .audio
            .as_ref()
            .map(|a| {
                std::fs::read(&a.path).map_err(|e| {
                    PixelcrossError::encode(format!(
                        "cannot read beep track '{}': {e}",
                        a.path.display()
                    ))
                })
            })
            .transpose()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PixelcrossResult<()> {
        if self.finished || self.cfg.is_none() {
            return Err(PixelcrossError::encode("sink is not accepting frames"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(PixelcrossError::encode(format!(
                "frame {} arrived after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PixelcrossResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
