use crate::foundation::error::{PixelcrossError, PixelcrossResult};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the global subscriber: human-readable events on stderr plus a plain-text log file.
///
/// `RUST_LOG` takes precedence over `level`. Keep the returned guard alive for the whole run;
/// dropping it flushes and closes the file writer.
pub fn init_logger(level: &str, file: &Path) -> PixelcrossResult<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| PixelcrossError::config(format!("invalid log level '{level}': {e}")))?;

    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = file
        .file_name()
        .ok_or_else(|| PixelcrossError::config(format!("invalid log file '{}'", file.display())))?;
    std::fs::create_dir_all(dir).map_err(|e| {
        PixelcrossError::config(format!("cannot create log dir '{}': {e}", dir.display()))
    })?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .map_err(|e| PixelcrossError::config(format!("logger already initialized: {e}")))?;

    Ok(guard)
}
