use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::upload::{UploadReceipt, Uploader, VideoMeta};
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("pixelcross/", env!("CARGO_PKG_VERSION"));

/// Uploads clips through the YouTube Data API v3 resumable upload protocol.
///
/// The OAuth access token is read from an environment variable on every upload, so an external
/// refresher can rotate it between clips. A missing token fails that upload only.
pub struct YouTubeUploader {
    client: Client,
    api_base: String,
    token_env: String,
    privacy: String,
    category_id: String,
}

#[derive(serde::Deserialize)]
struct InsertResponse {
    id: Option<String>,
}

impl YouTubeUploader {
    /// Build an uploader talking to `api_base` (normally `https://www.googleapis.com`).
    pub fn new(
        api_base: impl Into<String>,
        token_env: impl Into<String>,
        privacy: impl Into<String>,
        category_id: impl Into<String>,
    ) -> PixelcrossResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30 * 60))
            .build()
            .map_err(|e| PixelcrossError::upload(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            token_env: token_env.into(),
            privacy: privacy.into(),
            category_id: category_id.into(),
        })
    }

    fn access_token(&self) -> PixelcrossResult<String> {
        match std::env::var(&self.token_env) {
            Ok(t) if !t.trim().is_empty() => Ok(t.trim().to_owned()),
            _ => Err(PixelcrossError::upload(format!(
                "no access token in ${}",
                self.token_env
            ))),
        }
    }

    /// JSON resource sent when opening the upload session.
    pub fn insert_body(&self, meta: &VideoMeta) -> serde_json::Value {
        serde_json::json!({
            "snippet": {
                "title": meta.title,
                "description": meta.description,
                "tags": meta.tags,
                "categoryId": self.category_id,
            },
            "status": {
                "privacyStatus": self.privacy,
            },
        })
    }

    fn open_session(&self, token: &str, meta: &VideoMeta, len: u64) -> PixelcrossResult<String> {
        let url = format!("{}/upload/youtube/v3/videos", self.api_base);
        let resp = self
            .client
            .post(&url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", len.to_string())
            .json(&self.insert_body(meta))
            .send()
            .map_err(|e| PixelcrossError::upload(format!("upload session request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(PixelcrossError::upload(format!(
                "upload session rejected: HTTP {status}: {}",
                text.trim()
            )));
        }

        resp.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| PixelcrossError::upload("upload session response had no Location"))
    }
}

impl Uploader for YouTubeUploader {
    fn upload(&mut self, file: &Path, meta: &VideoMeta) -> PixelcrossResult<UploadReceipt> {
        let token = self.access_token()?;
        let len = std::fs::metadata(file)
            .map_err(|e| {
                PixelcrossError::upload(format!("cannot stat '{}': {e}", file.display()))
            })?
            .len();

        let session_url = self.open_session(&token, meta, len)?;
        tracing::debug!(bytes = len, "upload session opened");

        let f = std::fs::File::open(file).map_err(|e| {
            PixelcrossError::upload(format!("cannot open '{}': {e}", file.display()))
        })?;
        let resp = self
            .client
            .put(&session_url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "video/mp4")
            .body(Body::sized(f, len))
            .send()
            .map_err(|e| PixelcrossError::upload(format!("upload transfer failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(PixelcrossError::upload(format!(
                "upload rejected: HTTP {status}: {}",
                text.trim()
            )));
        }

        let body: InsertResponse = resp
            .json()
            .map_err(|e| PixelcrossError::upload(format!("unreadable upload response: {e}")))?;
        Ok(UploadReceipt { video_id: body.id })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/youtube.rs"]
mod tests;
