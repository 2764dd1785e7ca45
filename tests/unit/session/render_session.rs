use super::*;
use crate::config::ClipParams;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Fps};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn small_plan() -> ClipPlan {
    let params = ClipParams {
        canvas: Canvas {
            width: 16,
            height: 8,
        },
        fps: Fps::new(10, 1).unwrap(),
        reveal_secs: 2.0,
        pixel_interval_secs: 0.5,
        flash_secs: 1.0,
        flash_interval_secs: 0.2,
        pixel_count: 6,
        sample_rate: 8_000,
        ..ClipParams::default()
    };
    ClipPlan::generate(&params, &mut StdRng::seed_from_u64(21)).unwrap()
}

fn opts(parallel: bool, elision: bool, audio: bool) -> RenderOpts {
    RenderOpts {
        parallel,
        threads: parallel.then_some(2),
        chunk_size: 7,
        static_frame_elision: elision,
        channel_capacity: 2,
        enable_audio: audio,
    }
}

#[test]
fn sequential_render_is_ordered_and_complete() {
    let plan = small_plan();
    let sess = RenderSession::new(&plan, opts(false, false, false));
    let mut sink = InMemorySink::new();
    let stats = sess.render_clip(&mut sink).unwrap();

    assert_eq!(
        stats,
        RenderStats {
            frames_total: 30,
            frames_rendered: 30,
            frames_elided: 0,
        }
    );
    assert_eq!(sink.frames().len(), 30);
    for (i, (idx, _)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
    }
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (16, 8));
    assert!(cfg.audio.is_none());
}

#[test]
fn parallel_matches_sequential_output() {
    let plan = small_plan();
    let mut seq = InMemorySink::new();
    RenderSession::new(&plan, opts(false, false, false))
        .render_clip(&mut seq)
        .unwrap();

    for elision in [false, true] {
        let mut par = InMemorySink::new();
        RenderSession::new(&plan, opts(true, elision, false))
            .render_clip(&mut par)
            .unwrap();
        assert_eq!(seq.frames().len(), par.frames().len());
        for ((ia, a), (ib, b)) in seq.frames().iter().zip(par.frames().iter()) {
            assert_eq!(ia, ib);
            assert_eq!(a.data, b.data);
        }
    }
}

#[test]
fn static_frame_elision_skips_repeated_reveal_frames() {
    let plan = small_plan();
    let mut sink = InMemorySink::new();
    let stats = RenderSession::new(&plan, opts(false, true, false))
        .render_clip(&mut sink)
        .unwrap();
    assert_eq!(stats.frames_total, 30);
    assert_eq!(stats.frames_rendered + stats.frames_elided, 30);
    assert!(stats.frames_elided > 0);
    // Frames 0..5 all show the first pixel only.
    assert_eq!(sink.frames()[0].1.data, sink.frames()[4].1.data);
}

#[test]
fn audio_is_handed_to_sink_and_temp_file_removed() {
    let plan = small_plan();
    let mut sink = InMemorySink::new();
    RenderSession::new(&plan, opts(false, true, true))
        .render_clip(&mut sink)
        .unwrap();

    let cfg = sink.config().unwrap();
    let audio = cfg.audio.unwrap();
    assert_eq!(audio.sample_rate, 8_000);
    assert_eq!(audio.channels, 2);
    assert!(!audio.path.exists(), "temp audio file should be cleaned up");

    // 3 s at 8 kHz stereo f32.
    assert_eq!(sink.audio_bytes().unwrap().len(), 3 * 8_000 * 2 * 4);
}

#[test]
fn out_of_range_requests_are_rejected() {
    let plan = small_plan();
    let sess = RenderSession::new(&plan, opts(false, false, false));
    let mut sink = InMemorySink::new();
    let empty = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert!(sess.render_range(empty, &mut sink).is_err());
    let too_long = FrameRange::new(FrameIndex(0), FrameIndex(31)).unwrap();
    assert!(sess.render_range(too_long, &mut sink).is_err());
    assert!(sess.render_frame(FrameIndex(30)).is_err());
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> PixelcrossResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> PixelcrossResult<()> {
        if idx.0 == 3 {
            return Err(PixelcrossError::encode("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> PixelcrossResult<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_surface_to_caller() {
    let plan = small_plan();
    for parallel in [false, true] {
        let err = RenderSession::new(&plan, opts(parallel, false, false))
            .render_clip(&mut FailingSink)
            .unwrap_err();
        assert!(err.to_string().contains("disk full"), "{err}");
    }
}

#[test]
fn partial_range_audio_lines_up_with_its_frames() {
    let plan = small_plan();
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(20), FrameIndex(30)).unwrap();
    RenderSession::new(&plan, opts(false, true, true))
        .render_range(range, &mut sink)
        .unwrap();

    // Frames 20..30 at 10 fps cover 2 s..3 s: 8000 stereo f32 samples.
    let bytes = sink.audio_bytes().unwrap();
    assert_eq!(bytes.len(), 8_000 * 2 * 4);

    let full = crate::audio::tone::synthesize(&plan, 8_000, 2).unwrap();
    let expected: Vec<u8> = full[2 * 16_000..2 * 24_000]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    assert_eq!(bytes, expected.as_slice());
    assert_eq!(sink.frames().first().unwrap().0, FrameIndex(20));
}

/// Remembers the audio path it was handed, then refuses to start.
#[derive(Default)]
struct RejectingSink {
    audio_path: Option<std::path::PathBuf>,
}

impl FrameSink for RejectingSink {
    fn begin(&mut self, cfg: SinkConfig) -> PixelcrossResult<()> {
        let path = cfg.audio.map(|a| a.path);
        assert!(path.as_ref().is_some_and(|p| p.exists()));
        self.audio_path = path;
        Err(PixelcrossError::encode("ffmpeg not found"))
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> PixelcrossResult<()> {
        unreachable!("begin failed")
    }

    fn end(&mut self) -> PixelcrossResult<()> {
        unreachable!("begin failed")
    }
}

#[test]
fn temp_audio_is_removed_when_sink_fails_to_start() {
    let plan = small_plan();
    for parallel in [false, true] {
        let mut sink = RejectingSink::default();
        let err = RenderSession::new(&plan, opts(parallel, true, true))
            .render_clip(&mut sink)
            .unwrap_err();
        assert!(err.to_string().contains("ffmpeg not found"), "{err}");

        let path = sink.audio_path.unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("pixelcross_tones_"));
        assert!(!path.exists(), "{} left behind", path.display());
    }
}
