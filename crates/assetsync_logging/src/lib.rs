//! Shared logging setup for assetsync binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "assetsync=info,assetsync_db=info";
const VERBOSE_LOG_FILTER: &str = "assetsync=debug,assetsync_db=debug";
const MAX_LOG_FILES: usize = 7;

/// Environment variable that relocates the assetsync home directory.
pub const HOME_ENV: &str = "ASSETSYNC_HOME";

/// Logging configuration shared by assetsync binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Keeps the background file writer alive. Drop it on exit to flush logs.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize tracing with a daily rolling file and stderr output.
///
/// A missing or unwritable log directory only disables the file layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let (file_layer, guard) = match file_writer(config.app_name) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            (None, None)
        }
    };

    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        env_filter()
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

fn file_writer(app_name: &str) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let log_dir = ensure_logs_dir()?;
    Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(sanitize_name(app_name))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&log_dir)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))
}

/// Get the assetsync home directory: `$ASSETSYNC_HOME` or `~/.assetsync`.
pub fn assetsync_home() -> PathBuf {
    if let Some(override_path) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".assetsync")
}

/// Get the logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    assetsync_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("assetsync"), "assetsync");
        assert_eq!(sanitize_name("asset sync/cli"), "asset_sync_cli");
    }

    #[test]
    fn test_logs_dir_is_under_home() {
        assert!(logs_dir().starts_with(assetsync_home()));
    }
}
