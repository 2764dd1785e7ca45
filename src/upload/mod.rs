//! Handing finished clips to a video host.

use crate::config::UploadConfig;
use crate::foundation::error::PixelcrossResult;
use std::path::Path;

/// External uploader CLI.
pub mod command;
/// YouTube Data API resumable upload.
pub mod youtube;

pub use command::CommandUploader;
pub use youtube::YouTubeUploader;

/// Metadata attached to an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMeta {
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Tags (empty for generated clips).
    pub tags: Vec<String>,
}

impl VideoMeta {
    /// Metadata for a generated clip, where the description repeats the title.
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            description: title.clone(),
            title,
            tags: Vec::new(),
        }
    }
}

/// What the host reported back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Host-assigned video id, when the host reports one.
    pub video_id: Option<String>,
}

/// Destination for finished clips.
///
/// Implementations keep their client state across calls; one uploader serves a whole run.
pub trait Uploader {
    /// Upload `file` with `meta`.
    fn upload(&mut self, file: &Path, meta: &VideoMeta) -> PixelcrossResult<UploadReceipt>;
}

/// Uploader that uploads nothing.
#[derive(Debug, Default)]
pub struct NoUpload;

impl Uploader for NoUpload {
    fn upload(&mut self, file: &Path, meta: &VideoMeta) -> PixelcrossResult<UploadReceipt> {
        tracing::info!(file = %file.display(), title = %meta.title, "upload disabled, skipping");
        Ok(UploadReceipt::default())
    }
}

/// Build the uploader selected in config.
pub fn uploader_from_config(cfg: &UploadConfig) -> PixelcrossResult<Box<dyn Uploader>> {
    Ok(match cfg {
        UploadConfig::None => Box::new(NoUpload),
        UploadConfig::Command { program, args } => {
            Box::new(CommandUploader::new(program.clone(), args.clone()))
        }
        UploadConfig::YouTube {
            access_token_env,
            privacy,
            category_id,
            api_base,
        } => Box::new(YouTubeUploader::new(
            api_base.clone(),
            access_token_env.clone(),
            privacy.clone(),
            category_id.clone(),
        )?),
    })
}
