//! Run and clip configuration.
//!
//! Every field has a default matching the stock clip (1280x720 @ 24 fps, 16 s pixel reveal,
//! 4 s of flashes, 48 kHz beeps), so an empty JSON object `{}` is a valid config.

use crate::audio::MIX_SAMPLE_RATE;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parameters controlling what a single clip looks and sounds like.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipParams {
    /// Output frame size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Length of the pixel reveal phase.
    pub reveal_secs: f64,
    /// One more pixel appears (and one beep sounds) every `pixel_interval_secs`.
    pub pixel_interval_secs: f64,
    /// Length of the flash phase that follows the reveal.
    pub flash_secs: f64,
    /// Flashes toggle on/off every `flash_interval_secs`.
    pub flash_interval_secs: f64,
    /// Number of distinct pixel positions drawn for the clip.
    pub pixel_count: u32,
    /// Inclusive lower bound for beep frequencies.
    pub tone_min_hz: u32,
    /// Inclusive upper bound for beep frequencies.
    pub tone_max_hz: u32,
    /// Peak amplitude of each beep in `(0, 1]`.
    pub tone_amplitude: f32,
    /// Audio sample rate.
    pub sample_rate: u32,
    /// Number of block glyphs following the cross in generated titles.
    pub title_blocks: usize,
}

impl Default for ClipParams {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            reveal_secs: 16.0,
            pixel_interval_secs: 0.5,
            flash_secs: 4.0,
            flash_interval_secs: 0.2,
            pixel_count: 341,
            tone_min_hz: 1400,
            tone_max_hz: 3189,
            tone_amplitude: 0.2,
            sample_rate: MIX_SAMPLE_RATE,
            title_blocks: 6,
        }
    }
}

impl ClipParams {
    /// Full clip length (reveal + flash) in seconds.
    pub fn total_secs(&self) -> f64 {
        self.reveal_secs + self.flash_secs
    }

    /// Check that the parameters describe an encodable, non-aliasing clip.
    pub fn validate(&self) -> PixelcrossResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(PixelcrossError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(PixelcrossError::validation(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;

        for (name, v) in [
            ("reveal_secs", self.reveal_secs),
            ("pixel_interval_secs", self.pixel_interval_secs),
            ("flash_interval_secs", self.flash_interval_secs),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PixelcrossError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.flash_secs.is_finite() || self.flash_secs < 0.0 {
            return Err(PixelcrossError::validation(
                "flash_secs must be finite and >= 0",
            ));
        }

        if u64::from(self.pixel_count) > self.canvas.area() {
            return Err(PixelcrossError::validation(format!(
                "pixel_count {} exceeds canvas area {}",
                self.pixel_count,
                self.canvas.area()
            )));
        }

        if self.sample_rate == 0 {
            return Err(PixelcrossError::validation("sample_rate must be non-zero"));
        }
        if self.tone_min_hz > self.tone_max_hz {
            return Err(PixelcrossError::validation(
                "tone_min_hz must be <= tone_max_hz",
            ));
        }
        if self.tone_max_hz >= self.sample_rate / 2 {
            return Err(PixelcrossError::validation(format!(
                "tone_max_hz {} must be below the Nyquist frequency {}",
                self.tone_max_hz,
                self.sample_rate / 2
            )));
        }
        if !(self.tone_amplitude > 0.0 && self.tone_amplitude <= 1.0) {
            return Err(PixelcrossError::validation(
                "tone_amplitude must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Where finished clips go.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadConfig {
    /// Generate and clean up, but upload nothing.
    None,
    /// Hand the clip to an external uploader CLI.
    ///
    /// `{file}`, `{title}` and `{description}` inside `args` are substituted per clip.
    Command {
        /// Executable name or path.
        program: String,
        /// Argument template.
        #[serde(default)]
        args: Vec<String>,
    },
    /// Resumable upload to the YouTube Data API using a pre-issued OAuth access token.
    #[serde(rename = "youtube")]
    YouTube {
        /// Environment variable holding the bearer access token.
        #[serde(default = "default_token_env")]
        access_token_env: String,
        /// `privacyStatus` of uploaded videos.
        #[serde(default = "default_privacy")]
        privacy: String,
        /// Video category id.
        #[serde(default = "default_category")]
        category_id: String,
        /// API root, overridable for testing against a local server.
        #[serde(default = "default_api_base")]
        api_base: String,
    },
}

fn default_token_env() -> String {
    "YOUTUBE_ACCESS_TOKEN".to_owned()
}

fn default_privacy() -> String {
    "unlisted".to_owned()
}

fn default_category() -> String {
    "22".to_owned()
}

fn default_api_base() -> String {
    "https://www.googleapis.com".to_owned()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::YouTube {
            access_token_env: default_token_env(),
            privacy: default_privacy(),
            category_id: default_category(),
            api_base: default_api_base(),
        }
    }
}

/// Log sink configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter directive (`RUST_LOG` wins when set).
    pub level: String,
    /// Plain-text log file.
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: PathBuf::from("pixelcross.log"),
        }
    }
}

/// Top-level configuration for the generate/upload loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Clip look and sound.
    pub clip: ClipParams,
    /// Number of clips to produce; `None` loops forever.
    pub count: Option<u64>,
    /// Target spacing between clip starts.
    pub interval_secs: f64,
    /// Directory for clip files.
    pub work_dir: PathBuf,
    /// Clip files are named `{file_prefix}_{n}.mp4`, `n` starting at 1.
    pub file_prefix: String,
    /// Base seed; iteration `i` uses `seed + i`. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Keep clip files after upload instead of deleting them.
    pub keep_files: bool,
    /// Upload target.
    pub upload: UploadConfig,
    /// Logging.
    pub log: LogConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            clip: ClipParams::default(),
            count: Some(1440),
            interval_secs: 60.0,
            work_dir: PathBuf::from("."),
            file_prefix: "pixel_cross_video".to_owned(),
            seed: None,
            keep_files: false,
            upload: UploadConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl RunConfig {
    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> PixelcrossResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PixelcrossError::config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_json_str(&text)?;
        Ok(cfg)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(text: &str) -> PixelcrossResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| PixelcrossError::config(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate clip parameters and loop settings.
    pub fn validate(&self) -> PixelcrossResult<()> {
        self.clip.validate()?;
        self.interval()?;
        if self.file_prefix.trim().is_empty() {
            return Err(PixelcrossError::validation("file_prefix must be non-empty"));
        }
        if let UploadConfig::Command { program, .. } = &self.upload
            && program.trim().is_empty()
        {
            return Err(PixelcrossError::validation(
                "command uploader requires a non-empty program",
            ));
        }
        Ok(())
    }

    /// Spacing between clip starts.
    ///
    /// Negative, NaN and out-of-range values (anything `Duration` cannot hold) are rejected.
    pub fn interval(&self) -> PixelcrossResult<Duration> {
        Duration::try_from_secs_f64(self.interval_secs).map_err(|e| {
            PixelcrossError::validation(format!(
                "interval_secs {} is not a usable duration: {e}",
                self.interval_secs
            ))
        })
    }

        /// Path of the clip file for 0-based iteration `i`.
    pub fn clip_path(&self, i: u64) -> PathBuf {
        self.work_dir
            .join(format!("{}_{}.mp4", self.file_prefix, i + 1))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
