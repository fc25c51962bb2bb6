//! Logging setup for the concierge shell.
//!
//! Logs go to a daily rolling file under `~/.illora/logs` so stdout stays
//! reserved for command output. If the directory can't be created we fall
//! back to stderr.

use std::env;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "concierge.log";

fn filter() -> EnvFilter {
    let debug_enabled = env::var("ILLORA_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    if let Some(dir) = logs_dir {
        if std::fs::create_dir_all(dir).is_ok() {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            return Some(guard);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .init();
    None
}
