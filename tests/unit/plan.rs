use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn small_params() -> ClipParams {
    ClipParams {
        canvas: Canvas {
            width: 32,
            height: 16,
        },
        pixel_count: 40,
        ..ClipParams::default()
    }
}

#[test]
fn positions_are_distinct_and_in_bounds() {
    let canvas = Canvas {
        width: 20,
        height: 10,
    };
    for n in [0usize, 1, 50, 150, 200] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let pos = pixel_positions(&mut rng, n, canvas).unwrap();
        assert_eq!(pos.len(), n);
        let uniq: HashSet<_> = pos.iter().copied().collect();
        assert_eq!(uniq.len(), n);
        assert!(pos.iter().all(|&(x, y)| x < 20 && y < 10));
    }
}

#[test]
fn positions_reject_overfull_canvas() {
    let mut rng = StdRng::seed_from_u64(0);
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    assert!(pixel_positions(&mut rng, 5, canvas).is_err());
}

#[test]
fn stock_plan_has_expected_shape() {
    let mut rng = StdRng::seed_from_u64(3);
    let plan = ClipPlan::generate(&ClipParams::default(), &mut rng).unwrap();
    assert_eq!(plan.pixels.len(), 341);
    assert_eq!(plan.duration_frames(), 480);
    assert_eq!(plan.reveal_frames(), 384);
    assert_eq!(plan.flash_colors.len(), 96);

    // 32 reveal beeps (every 0.5 s over 16 s) + 20 flash beeps (every 0.2 s over 4 s).
    assert_eq!(plan.tones.len(), 52);
    assert!((plan.tones[31].start_sec - 15.5).abs() < 1e-9);
    assert!((plan.tones[32].start_sec - 16.0).abs() < 1e-9);
    assert!((plan.tones[32].len_sec - 0.2).abs() < 1e-9);
    assert!((plan.tones[51].start_sec - 19.8).abs() < 1e-9);
}

#[test]
fn tone_frequencies_respect_bounds() {
    let mut rng = StdRng::seed_from_u64(11);
    let plan = ClipPlan::generate(&ClipParams::default(), &mut rng).unwrap();
    assert!(
        plan.tones
            .iter()
            .all(|t| (1400..=3189).contains(&t.freq_hz))
    );
}

#[test]
fn same_seed_same_plan() {
    let params = small_params();
    let a = ClipPlan::generate(&params, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = ClipPlan::generate(&params, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(a.pixels, b.pixels);
    assert_eq!(a.background, b.background);
    assert_eq!(a.flash_colors, b.flash_colors);
    assert_eq!(a.tones, b.tones);
}

#[test]
fn invalid_params_fail_generation() {
    let params = ClipParams {
        pixel_interval_secs: -1.0,
        ..small_params()
    };
    assert!(ClipPlan::generate(&params, &mut StdRng::seed_from_u64(0)).is_err());
}

#[test]
fn reveal_beeps_stop_with_the_last_pixel() {
    let params = ClipParams {
        pixel_count: 2,
        ..ClipParams::default()
    };
    let plan = ClipPlan::generate(&params, &mut StdRng::seed_from_u64(4)).unwrap();
    let reveal: Vec<_> = plan
        .tones
        .iter()
        .filter(|t| t.start_sec < params.reveal_secs)
        .collect();
    assert_eq!(reveal.len(), 2);
    assert!((reveal[1].start_sec - 0.5).abs() < 1e-9);
    // Flash beeps are unaffected.
    assert_eq!(plan.tones.len(), 2 + 20);
}
