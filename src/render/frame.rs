use crate::foundation::core::{FrameIndex, Rgb8, whole_steps};
use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::plan::ClipPlan;

/// A rendered frame: opaque RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, alpha always 255.
    pub data: Vec<u8>,
}

/// Identity of a frame's visible content.
///
/// Two frames with equal keys are pixel-identical, which is what static-frame elision relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKey {
    /// Background plus the first `shown` pixels of the plan.
    Reveal {
        /// Number of pixels painted.
        shown: usize,
    },
    /// Whole frame filled with a single flash color.
    Flash {
        /// Flash color.
        color: Rgb8,
    },
    /// Background only (the "off" half of the flash cycle).
    Background,
}

/// Decide what `frame` shows.
pub fn frame_key(plan: &ClipPlan, frame: FrameIndex) -> PixelcrossResult<FrameKey> {
    let total = plan.duration_frames();
    if frame.0 >= total {
        return Err(PixelcrossError::render(format!(
            "frame {} is outside the clip (0..{total})",
            frame.0
        )));
    }

    let p = &plan.params;
    if frame.0 < plan.reveal_frames() {
        let t = plan.frame_time_secs(frame);
        let step = whole_steps(t, p.pixel_interval_secs);
        let shown = usize::try_from(step.saturating_add(1))
            .unwrap_or(usize::MAX)
            .min(plan.pixels.len());
        return Ok(FrameKey::Reveal { shown });
    }

    let t = plan.frame_time_secs(frame) - p.reveal_secs;
    let step = whole_steps(t.max(0.0), p.flash_interval_secs);
    if step % 2 == 1 {
        return Ok(FrameKey::Background);
    }
    let flash_idx = (frame.0 - plan.reveal_frames()) as usize;
    let color = plan.flash_colors.get(flash_idx).copied().ok_or_else(|| {
        PixelcrossError::render(format!("missing flash color for flash frame {flash_idx}"))
    })?;
    Ok(FrameKey::Flash { color })
}

/// Paint the frame described by `key`.
pub fn paint_frame(plan: &ClipPlan, key: FrameKey) -> FrameRGBA {
    let canvas = plan.params.canvas;
    let fill = match key {
        FrameKey::Flash { color } => color,
        FrameKey::Reveal { .. } | FrameKey::Background => plan.background,
    };

    let mut data = vec![0u8; (canvas.width as usize) * (canvas.height as usize) * 4];
    let rgba = fill.to_rgba8();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }

    if let FrameKey::Reveal { shown } = key {
        let stride = canvas.width as usize * 4;
        for p in plan.pixels.iter().take(shown) {
            let i = p.y as usize * stride + p.x as usize * 4;
            data[i..i + 4].copy_from_slice(&p.color.to_rgba8());
        }
    }

    FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
    }
}

/// Evaluate and paint `frame` in one step.
pub fn render_frame(plan: &ClipPlan, frame: FrameIndex) -> PixelcrossResult<FrameRGBA> {
    let key = frame_key(plan, frame)?;
    Ok(paint_frame(plan, key))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
