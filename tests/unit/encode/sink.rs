use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps { num: 10, den: 1 },
        audio: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![255; 16],
    }
}

#[test]
fn frame_len_is_rgba8() {
    assert_eq!(cfg().frame_len(), 16);
}

#[test]
fn in_memory_sink_enforces_order_and_lifecycle() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame()).is_err());

    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(2), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(2), &frame()).is_err());
    assert!(sink.push_frame(FrameIndex(1), &frame()).is_err());
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert!(sink.push_frame(FrameIndex(3), &frame()).is_err());
    assert_eq!(sink.frames().len(), 2);

    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}

#[test]
fn in_memory_sink_copies_beep_track_at_begin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.f32le");
    std::fs::write(&path, 0.25f32.to_le_bytes()).unwrap();
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        audio: Some(AudioInputConfig {
            path: path.clone(),
            sample_rate: 8_000,
            channels: 1,
        }),
        ..cfg()
    })
    .unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(sink.audio_bytes().unwrap(), 0.25f32.to_le_bytes());

    let mut missing = InMemorySink::new();
    let err = missing
        .begin(SinkConfig {
            audio: Some(AudioInputConfig {
                path,
                sample_rate: 8_000,
                channels: 1,
            }),
            ..cfg()
        })
        .unwrap_err();
    assert!(err.to_string().contains("beep track"), "{err}");
}
