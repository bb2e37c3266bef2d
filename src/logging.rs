//! Logging configuration for the analyzer

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "rootcause.log";

/// Build the env filter; `RUST_LOG` wins over the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},rootcause={level}")))
}

/// Initialize logging from configuration
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    init_logging_with_level(config, &config.level)
}

/// Initialize logging with a level that overrides the configured one
pub fn init_logging_with_level(config: &LoggingConfig, level: &str) -> Result<Option<WorkerGuard>> {
    // Console output goes to stderr so stdout stays clean for command results
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = if config.file_output {
        let logs_dir = Path::new(&config.log_dir);
        if !logs_dir.exists() {
            std::fs::create_dir_all(logs_dir)?;
        }

        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(non_blocking)
            .with_ansi(false); // No colors in file

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(env_filter(level))
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized with level: {}", level);
    if config.file_output {
        tracing::info!(
            "Log files will be saved to: {}/{}.YYYY-MM-DD",
            config.log_dir,
            LOG_FILE_PREFIX
        );
    }

    Ok(guard)
}

/// Initialize simple console logging for tests and one-shot commands
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_logging_is_reentrant() {
        init_simple_logging();
        init_simple_logging();
    }

    #[test]
    fn test_env_filter_accepts_configured_level() {
        let filter = env_filter("debug");
        assert!(!filter.to_string().is_empty());
    }
}
