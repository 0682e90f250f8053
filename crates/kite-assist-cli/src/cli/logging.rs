//! File-backed tracing setup.
//!
//! Logs go to a daily-rolled file under the kite-assist home so the
//! interactive chat stays clean on stdout/stderr. `RUST_LOG` overrides
//! the default filter.

use kite_assist_core::settings::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "kite_assist_core=info,kite_assist_cli=info";
const LOG_FILE_PREFIX: &str = "kite-assist.log";

/// Initializes tracing. The returned guard must live for the duration
/// of the process or buffered log lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        // No log directory, no logging. The CLI still works.
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init();

    if result.is_err() {
        // A subscriber is already installed (tests), keep going.
        return None;
    }

    Some(guard)
}
