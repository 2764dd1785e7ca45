use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PixelcrossError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PixelcrossError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        PixelcrossError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        PixelcrossError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        PixelcrossError::upload("x")
            .to_string()
            .contains("upload error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PixelcrossError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
