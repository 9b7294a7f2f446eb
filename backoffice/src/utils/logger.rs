//! Logging Infrastructure
//!
//! `RUST_LOG` controls the filter (default `backoffice=info,tower_http=info`).
//! When `log_dir` exists, output goes to a daily rolling file instead of
//! stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "backoffice=info,tower_http=info";

/// Initialize the global subscriber
///
/// Returns the appender guard when logging to file; keep it alive for the
/// lifetime of the process so buffered lines are flushed.
pub fn init_logger(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir.filter(|d| d.exists()) {
        let file_appender = tracing_appender::rolling::daily(dir, "backoffice.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        subscriber.with_ansi(false).with_writer(writer).init();
        return Some(guard);
    }

    subscriber.init();
    None
}
