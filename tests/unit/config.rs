use super::*;

#[test]
fn empty_object_yields_stock_defaults() {
    let cfg = RunConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RunConfig::default());
    assert_eq!(cfg.clip.canvas.width, 1280);
    assert_eq!(cfg.clip.pixel_count, 341);
    assert_eq!(cfg.count, Some(1440));
    assert!((cfg.clip.total_secs() - 20.0).abs() < 1e-12);
}

#[test]
fn null_count_means_forever() {
    let cfg = RunConfig::from_json_str(r#"{ "count": null }"#).unwrap();
    assert_eq!(cfg.count, None);
}

#[test]
fn upload_variants_parse() {
    let cfg = RunConfig::from_json_str(r#"{ "upload": { "kind": "none" } }"#).unwrap();
    assert_eq!(cfg.upload, UploadConfig::None);

    let cfg = RunConfig::from_json_str(
        r#"{ "upload": { "kind": "command", "program": "up", "args": ["{file}", "{title}"] } }"#,
    )
    .unwrap();
    assert_eq!(
        cfg.upload,
        UploadConfig::Command {
            program: "up".to_owned(),
            args: vec!["{file}".to_owned(), "{title}".to_owned()],
        }
    );

    let cfg =
        RunConfig::from_json_str(r#"{ "upload": { "kind": "youtube", "privacy": "private" } }"#)
            .unwrap();
    let UploadConfig::YouTube {
        privacy,
        category_id,
        access_token_env,
        ..
    } = cfg.upload
    else {
        panic!("expected youtube upload config");
    };
    assert_eq!(privacy, "private");
    assert_eq!(category_id, "22");
    assert_eq!(access_token_env, "YOUTUBE_ACCESS_TOKEN");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = RunConfig::from_json_str(r#"{ "clip": { "pixels": 3 } }"#).unwrap_err();
    assert!(err.to_string().contains("config error:"));
}

#[test]
fn validation_catches_bad_values() {
    let mut p = ClipParams::default();
    p.canvas.width = 1279;
    assert!(p.validate().is_err());

    let mut p = ClipParams::default();
    p.pixel_interval_secs = 0.0;
    assert!(p.validate().is_err());

    let mut p = ClipParams::default();
    p.canvas = Canvas {
        width: 2,
        height: 2,
    };
    p.pixel_count = 5;
    assert!(p.validate().is_err());

    let mut p = ClipParams::default();
    p.tone_max_hz = 24_000;
    assert!(p.validate().is_err());

    let mut p = ClipParams::default();
    p.tone_min_hz = 4000;
    assert!(p.validate().is_err());

    let mut p = ClipParams::default();
    p.tone_amplitude = 1.5;
    assert!(p.validate().is_err());

    let cfg = RunConfig {
        upload: UploadConfig::Command {
            program: " ".to_owned(),
            args: vec![],
        },
        ..RunConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn clip_paths_are_one_based() {
    let cfg = RunConfig {
        work_dir: PathBuf::from("out"),
        ..RunConfig::default()
    };
    assert_eq!(
        cfg.clip_path(0),
        PathBuf::from("out").join("pixel_cross_video_1.mp4")
    );
}

#[test]
fn shipped_example_config_parses_and_validates() {
    let cfg = RunConfig::from_json_str(include_str!("../../pixelcross.example.json")).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.clip, ClipParams::default());
    assert_eq!(cfg.upload, UploadConfig::default());
    assert_eq!(cfg.work_dir, PathBuf::from("clips"));
}

#[test]
fn interval_must_fit_a_duration() {
    let mut cfg = RunConfig::default();
    assert_eq!(cfg.interval().unwrap(), Duration::from_secs(60));

    cfg.interval_secs = 0.0;
    assert_eq!(cfg.interval().unwrap(), Duration::ZERO);

    for bad in [1e20, -1.0, f64::NAN, f64::INFINITY] {
        cfg.interval_secs = bad;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("interval_secs"), "{err}");
    }
    assert!(RunConfig::from_json_str(r#"{ "interval_secs": 1e20 }"#).is_err());
}
