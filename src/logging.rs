//! Logging initialization for onboard.
//!
//! TUI mode: logs to `<state>/logs/onboard-{datetime}.log`
//! CLI mode: logs to stderr

use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Guard that must be kept alive for the duration of the program.
    /// When dropped, ensures all buffered logs are flushed.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in TUI mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Log file name for a session started now
fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("onboard-{}.log", timestamp)
}

/// Level filter: `--debug` beats config, `RUST_LOG` beats both
fn filter_directive(config: &Config, debug_override: bool) -> String {
    let configured = if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    std::env::var("RUST_LOG").unwrap_or(configured)
}

/// Initialize logging based on mode and configuration.
///
/// The terminal belongs to the UI in TUI mode, so output goes to a file there.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = tracing_subscriber::EnvFilter::new(filter_directive(config, debug_override));

    if is_tui_mode && config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)?;

        let log_filename = log_file_name();
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false) // No ANSI codes in log files
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}
