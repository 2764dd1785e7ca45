//! MP4 output through the system `ffmpeg`.
//!
//! Clip frames are opaque RGBA and go to ffmpeg's stdin untouched. The beep track is read from
//! the raw `f32le` file named in [`SinkConfig::audio`], which every clip must have.

use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::render::frame::FrameRGBA;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// x264 speed/size preset.
    pub preset: String,
    /// AAC bitrate for the beep track.
    pub audio_bitrate: String,
}

impl FfmpegSinkOpts {
    /// Overwriting `medium`-preset output at `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            preset: "medium".to_owned(),
            audio_bitrate: "128k".to_owned(),
        }
    }
}

/// Writes a clip to MP4 (H.264 yuv420p + AAC) by piping raw frames into `ffmpeg`.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    /// Create a sink; `ffmpeg` is spawned in [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }
}

/// A running `ffmpeg` process for one clip.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    width: u32,
    height: u32,
    frame_len: usize,
    last: Option<FrameIndex>,
}

impl Encoder {
    fn spawn(args: Vec<OsString>, cfg: &SinkConfig) -> PixelcrossResult<Self> {
        tracing::debug!(?args, "spawning ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PixelcrossError::encode(format!("cannot start ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf)?;
                Ok(buf)
            })
        });

        Ok(Self {
            child,
            stdin,
            stderr,
            width: cfg.width,
            height: cfg.height,
            frame_len: cfg.frame_len(),
            last: None,
        })
    }

    fn write(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PixelcrossResult<()> {
        if self.last.is_some_and(|last| idx <= last) {
            return Err(PixelcrossError::encode(format!(
                "frame {} pushed after frame {}",
                idx.0,
                self.last.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (self.width, self.height)
            || frame.data.len() != self.frame_len
        {
            return Err(PixelcrossError::validation(format!(
                "frame {} is {}x{} ({} bytes), clip is {}x{}",
                idx.0,
                frame.width,
                frame.height,
                frame.data.len(),
                self.width,
                self.height
            )));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| PixelcrossError::encode("ffmpeg stdin already closed"))?;
        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe means ffmpeg died; its stderr says why.
            let detail = self.finish().err().map(|f| f.to_string());
            return Err(PixelcrossError::encode(format!(
                "writing frame {} to ffmpeg failed: {e}{}",
                idx.0,
                detail.map(|d| format!(" ({d})")).unwrap_or_default()
            )));
        }
        self.last = Some(idx);
        Ok(())
    }

    fn finish(&mut self) -> PixelcrossResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| PixelcrossError::encode(format!("waiting for ffmpeg failed: {e}")))?;
        let stderr = match self.stderr.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            Some(Ok(Err(e))) => format!("<stderr unreadable: {e}>"),
            Some(Err(_)) => "<stderr reader panicked>".to_owned(),
            None => String::new(),
        };
        if status.success() {
            Ok(())
        } else {
            Err(PixelcrossError::encode(format!("ffmpeg {status}: {stderr}")))
        }
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn check_clip_format(cfg: &SinkConfig) -> PixelcrossResult<&AudioInputConfig> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(PixelcrossError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(PixelcrossError::validation("clip size must be non-zero"));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(PixelcrossError::validation(format!(
            "clip size {}x{} must be even for yuv420p",
            cfg.width, cfg.height
        )));
    }

    let audio = cfg
        .audio
        .as_ref()
        .ok_or_else(|| PixelcrossError::validation("mp4 clips need a beep track"))?;
    if audio.sample_rate == 0 || audio.channels == 0 {
        return Err(PixelcrossError::validation(
            "beep track sample rate and channel count must be non-zero",
        ));
    }
    if !audio.path.is_file() {
        return Err(PixelcrossError::encode(format!(
            "beep track '{}' does not exist",
            audio.path.display()
        )));
    }
    Ok(audio)
}

/// Command line for encoding a clip described by `cfg` with beeps from `audio`.
fn encoder_args(
    cfg: &SinkConfig,
    audio: &AudioInputConfig,
    opts: &FfmpegSinkOpts,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(40);
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if opts.overwrite { "-y" } else { "-n" }, "-loglevel", "error"]);
    // Video: raw opaque RGBA on stdin; `-r` before `-i` sets the input rate.
    push(&[
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.width, cfg.height),
        "-r",
        &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i",
        "pipe:0",
    ]);
    // Audio: interleaved f32le beeps.
    push(&[
        "-f",
        "f32le",
        "-ar",
        &audio.sample_rate.to_string(),
        "-ac",
        &audio.channels.to_string(),
        "-i",
    ]);
    args.push(audio.path.clone().into_os_string());

    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));
    push(&[
        "-c:v",
        "libx264",
        "-preset",
        &opts.preset,
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-b:a",
        &opts.audio_bitrate,
        "-shortest",
        "-movflags",
        "+faststart",
    ]);
    args.push(opts.out_path.clone().into_os_string());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> PixelcrossResult<()> {
        if self.encoder.is_some() {
            return Err(PixelcrossError::encode("ffmpeg sink already started"));
        }
        let audio = check_clip_format(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(PixelcrossError::validation(format!(
                "'{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let args = encoder_args(&cfg, audio, &self.opts);
        self.encoder = Some(Encoder::spawn(args, &cfg)?);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PixelcrossResult<()> {
        self.encoder
            .as_mut()
            .ok_or_else(|| PixelcrossError::encode("ffmpeg sink not started"))?
            .write(idx, frame)
    }

    fn end(&mut self) -> PixelcrossResult<()> {
        let mut encoder = self
            .encoder
            .take()
            .ok_or_else(|| PixelcrossError::encode("ffmpeg sink not started"))?;
        encoder.finish()?;
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> PixelcrossResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                PixelcrossError::encode(format!("cannot create '{}': {e}", parent.display()))
            })
        }
        _ => Ok(()),
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
