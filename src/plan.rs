//! Per-clip random draws.
//!
//! All randomness for a clip is drawn once, up front, into a [`ClipPlan`]. Painting frame `n` and
//! synthesizing audio are then pure functions of the plan, which keeps parallel rendering
//! deterministic for a given seed.

use crate::config::ClipParams;
use crate::foundation::core::{Canvas, FrameIndex, Rgb8, STEP_EPSILON};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use rand::Rng;
use std::collections::HashSet;

/// One revealed pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pixel {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Color painted at `(x, y)`.
    pub color: Rgb8,
}

/// One scheduled beep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    /// Start time in clip seconds.
    pub start_sec: f64,
    /// Beep length in seconds.
    pub len_sec: f64,
    /// Sine frequency in Hz.
    pub freq_hz: u32,
}

/// Everything random about one clip.
#[derive(Clone, Debug)]
pub struct ClipPlan {
    /// Parameters the plan was drawn for.
    pub params: ClipParams,
    /// Fill color behind the revealed pixels.
    pub background: Rgb8,
    /// Pixels in reveal order.
    pub pixels: Vec<Pixel>,
    /// Full-frame color for each frame of the flash phase, indexed from the first flash frame.
    pub flash_colors: Vec<Rgb8>,
    /// Beep schedule covering both phases.
    pub tones: Vec<Tone>,
}

/// Uniform random opaque color.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb8 {
    Rgb8::new(rng.random(), rng.random(), rng.random())
}

/// Draw `n` distinct in-bounds positions.
pub fn pixel_positions<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    canvas: Canvas,
) -> PixelcrossResult<Vec<(u32, u32)>> {
    let area = canvas.area();
    if n as u64 > area {
        return Err(PixelcrossError::render(format!(
            "cannot place {n} distinct pixels on a {}x{} canvas",
            canvas.width, canvas.height
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    // Dense requests would spin in rejection sampling; shuffle the index space instead.
    if (n as u64).saturating_mul(2) > area {
        let mut idx: Vec<u64> = (0..area).collect();
        for i in 0..n {
            let j = rng.random_range(i..idx.len());
            idx.swap(i, j);
        }
        let w = u64::from(canvas.width);
        return Ok(idx[..n]
            .iter()
            .map(|&i| ((i % w) as u32, (i / w) as u32))
            .collect());
    }

    let mut seen = HashSet::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let p = (
            rng.random_range(0..canvas.width),
            rng.random_range(0..canvas.height),
        );
        if seen.insert(p) {
            out.push(p);
        }
    }
    Ok(out)
}

impl ClipPlan {
    /// Draw a plan for `params`.
    ///
    /// Draw order is positions, pixel colors, background, flash colors, tones.
    pub fn generate<R: Rng + ?Sized>(params: &ClipParams, rng: &mut R) -> PixelcrossResult<Self> {
        params.validate()?;

        let positions = pixel_positions(rng, params.pixel_count as usize, params.canvas)?;
        let pixels = positions
            .into_iter()
            .map(|(x, y)| Pixel {
                x,
                y,
                color: random_color(rng),
            })
            .collect();
        let background = random_color(rng);

        let mut plan = Self {
            params: params.clone(),
            background,
            pixels,
            flash_colors: Vec::new(),
            tones: Vec::new(),
        };

        let flash_frames = plan.duration_frames() - plan.reveal_frames();
        plan.flash_colors = (0..flash_frames).map(|_| random_color(rng)).collect();
        plan.tones = schedule_tones(params, rng);
        Ok(plan)
    }

    /// Total frame count of the clip.
    pub fn duration_frames(&self) -> u64 {
        self.params
            .fps
            .secs_to_frames_ceil(self.params.total_secs())
    }

    /// Frames whose timestamp falls inside the reveal phase.
    pub fn reveal_frames(&self) -> u64 {
        self.params
            .fps
            .secs_to_frames_ceil(self.params.reveal_secs)
            .min(self.duration_frames())
    }

    /// Clip timestamp of `frame` in seconds.
    pub fn frame_time_secs(&self, frame: FrameIndex) -> f64 {
        self.params.fps.frames_to_secs(frame.0)
    }
}

fn schedule_tones<R: Rng + ?Sized>(params: &ClipParams, rng: &mut R) -> Vec<Tone> {
    let mut tones = Vec::new();
    let hz = params.tone_min_hz..=params.tone_max_hz;

    // One reveal beep per pixel that actually appears.
    for k in 0..u64::from(params.pixel_count) {
        let start_sec = k as f64 * params.pixel_interval_secs;
        if start_sec >= params.reveal_secs - STEP_EPSILON {
            break;
        }
        tones.push(Tone {
            start_sec,
            len_sec: params.pixel_interval_secs,
            freq_hz: rng.random_range(hz.clone()),
        });
    }

    let total = params.total_secs();
    let mut j = 0u64;
    loop {
        let start_sec = params.reveal_secs + j as f64 * params.flash_interval_secs;
        if start_sec >= total - STEP_EPSILON {
            break;
        }
        tones.push(Tone {
            start_sec,
            len_sec: params.flash_interval_secs,
            freq_hz: rng.random_range(hz.clone()),
        });
        j += 1;
    }
    tones
}

#[cfg(test)]
#[path = "../tests/unit/plan.rs"]
mod tests;
