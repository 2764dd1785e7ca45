/// Convenience result type used across pixelcross.
pub type PixelcrossResult<T> = Result<T, PixelcrossError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum PixelcrossError {
    /// Invalid user-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Errors while planning or painting frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors from the `ffmpeg` encoding pipeline.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors while handing a finished clip to the video host.
    #[error("upload error: {0}")]
    Upload(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelcrossError {
    /// Build a [`PixelcrossError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixelcrossError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PixelcrossError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PixelcrossError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PixelcrossError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
