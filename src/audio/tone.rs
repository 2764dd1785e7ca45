use crate::foundation::core::{FrameRange, STEP_EPSILON};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::plan::ClipPlan;
use std::ops::Range;
use std::path::Path;

/// Number of sample frames covering the whole clip at `sample_rate`.
pub fn total_samples(plan: &ClipPlan, sample_rate: u32) -> u64 {
    secs_to_samples(plan.params.total_secs(), f64::from(sample_rate)) as u64
}

/// Sample frames of the clip track that line up with the video frames in `range`.
///
/// The end is clamped to [`total_samples`], since the last video frame may run past the clip
/// length.
pub fn sample_span(plan: &ClipPlan, sample_rate: u32, range: FrameRange) -> Range<usize> {
    let sr = f64::from(sample_rate);
    let fps = plan.params.fps;
    let total = total_samples(plan, sample_rate) as usize;
    let end = secs_to_samples(fps.frames_to_secs(range.end.0), sr).min(total);
    let start = secs_to_samples(fps.frames_to_secs(range.start.0), sr).min(end);
    start..end
}

fn secs_to_samples(secs: f64, sample_rate: f64) -> usize {
    (secs * sample_rate + STEP_EPSILON).floor().max(0.0) as usize
}

/// Render the plan's beep schedule into interleaved PCM.
///
/// Each tone is a plain sine at the plan's amplitude, starting at phase zero, truncated at the end
/// of the clip. The mono signal is written to every channel.
pub fn synthesize(plan: &ClipPlan, sample_rate: u32, channels: u16) -> PixelcrossResult<Vec<f32>> {
    if sample_rate == 0 {
        return Err(PixelcrossError::validation("sample_rate must be non-zero"));
    }
    if channels == 0 {
        return Err(PixelcrossError::validation("channels must be non-zero"));
    }

    let frames = total_samples(plan, sample_rate) as usize;
    let mut mono = vec![0.0f32; frames];
    let amp = plan.params.tone_amplitude;
    let sr = f64::from(sample_rate);

    for tone in &plan.tones {
        let start = secs_to_samples(tone.start_sec, sr);
        if start >= frames {
            continue;
        }
        let len = secs_to_samples(tone.len_sec, sr);
        let end = start.saturating_add(len).min(frames);
        let w = std::f64::consts::TAU * f64::from(tone.freq_hz) / sr;
        for (n, s) in mono[start..end].iter_mut().enumerate() {
            *s += amp * (w * n as f64).sin() as f32;
        }
    }

    let ch = usize::from(channels);
    let mut out = Vec::with_capacity(frames * ch);
    for s in mono {
        let s = s.clamp(-1.0, 1.0);
        out.extend(std::iter::repeat_n(s, ch));
    }
    Ok(out)
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub fn write_f32le(samples_interleaved: &[f32], out_path: &Path) -> PixelcrossResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PixelcrossError::encode(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        PixelcrossError::encode(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/tone.rs"]
mod tests;
