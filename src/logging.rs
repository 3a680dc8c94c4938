use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Daily-rotated log file, e.g. `logs/telebot.2026-02-22.log`, keeping the
/// newest `max_files`.
pub fn file_appender(config: &LoggingConfig) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "Failed to create log directory: {}",
            config.directory.display()
        )
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files.max(1))
        .build(&config.directory)
        .context("Failed to open log file")
}

/// Install the global subscriber: console plus file, both filtered by
/// `RUST_LOG` (default `info,telerelay=debug`).
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(config)?);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,telerelay=debug".into()))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_creates_directory_and_file() {
        let dir = std::env::temp_dir().join(format!("telerelay-logs-{}", std::process::id()));
        let config = LoggingConfig {
            directory: dir.clone(),
            file_prefix: "telebot".to_string(),
            max_files: 30,
        };

        let mut appender = file_appender(&config).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names
            .iter()
            .any(|n| n.starts_with("telebot.") && n.ends_with(".log")));

        std::fs::remove_dir_all(&dir).ok();
    }
}
