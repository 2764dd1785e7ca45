use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert!(Fps::new(30000, 1001).is_ok());
}

#[test]
fn secs_to_frames_rounds_up_partial_frames() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(20.0), 480);
    assert_eq!(fps.secs_to_frames_ceil(0.01), 1);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn frames_to_secs_uses_rational_fps() {
    let fps = Fps::new(30000, 1001).unwrap();
    let t = fps.frames_to_secs(30000);
    assert!((t - 1001.0).abs() < 1e-9);
}

#[test]
fn frame_range_validates_and_measures() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(1), FrameIndex(1)).unwrap().is_empty());
}

#[test]
fn whole_steps_tolerates_float_error() {
    assert_eq!(whole_steps(1.0, 0.2), 5);
    assert_eq!(whole_steps(0.6, 0.2), 3);
    assert_eq!(whole_steps(0.49, 0.5), 0);
}

#[test]
fn rgb_to_rgba_is_opaque() {
    assert_eq!(Rgb8::new(1, 2, 3).to_rgba8(), [1, 2, 3, 255]);
}
