//! Beep synthesis and raw PCM output.

/// Default clip sample rate.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Output channel count (mono beeps duplicated to stereo).
pub const MIX_CHANNELS: u16 = 2;

/// Sine-tone synthesis.
pub mod tone;
