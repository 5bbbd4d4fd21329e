//! Logging and tracing configuration
//!
//! Every run logs to two sinks:
//! 1. stderr, coloured, INFO and above (overridable with `RUST_LOG`)
//! 2. `<project_root>/logs/api_test_<timestamp>.log`, DEBUG and above,
//!    a fresh file per run

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::paths;

/// Handle kept alive by `main` so buffered file logs are flushed on exit
pub struct LogHandle {
    /// Path of this run's log file, if file logging is active
    pub path: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

/// Build the log file name for a run started now
///
/// Millisecond precision keeps back-to-back runs from sharing a file.
pub fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("api_test_{}.log", now.format("%Y%m%d_%H%M%S_%3f"))
}

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apicase=info,warn"))
}

/// Initialize tracing for a test run (console + per-run file)
pub fn init() -> LogHandle {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(console_filter());

    let dir = match paths::ensure_log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing_subscriber::registry().with(console_layer).init();
            tracing::warn!("Could not create log directory, logging to console only: {}", e);
            return LogHandle {
                path: None,
                _guard: None,
            };
        }
    };

    let file_name = log_file_name(chrono::Local::now());
    let appender = tracing_appender::rolling::never(&dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    LogHandle {
        path: Some(dir.join(file_name)),
        _guard: Some(guard),
    }
}
