use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use crate::upload::{UploadReceipt, Uploader, VideoMeta};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs an external uploader program once per clip.
///
/// Each argument template may contain `{file}`, `{title}` and `{description}`. The last non-empty
/// line the program prints on stdout is taken as the video id.
#[derive(Clone, Debug)]
pub struct CommandUploader {
    program: String,
    args: Vec<String>,
}

impl CommandUploader {
    /// Create an uploader for `program` with argument templates `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand_args(&self, file: &Path, meta: &VideoMeta) -> Vec<String> {
        let file = file.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace("{file}", &file)
                    .replace("{title}", &meta.title)
                    .replace("{description}", &meta.description)
            })
            .collect()
    }
}

impl Uploader for CommandUploader {
    fn upload(&mut self, file: &Path, meta: &VideoMeta) -> PixelcrossResult<UploadReceipt> {
        let args = self.expand_args(file, meta);
        tracing::debug!(program = %self.program, ?args, "running uploader");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                PixelcrossError::upload(format!("failed to run '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PixelcrossError::upload(format!(
                "'{}' exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let video_id = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .map(str::to_owned);
        Ok(UploadReceipt { video_id })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/command.rs"]
mod tests;
