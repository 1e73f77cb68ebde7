//! Structured logging setup: `tracing-subscriber`'s fmt layer with an
//! `EnvFilter` driven by `RUST_LOG` (default `info`), optionally mirrored
//! to a rolling file appender via `tracing-appender`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber for stderr output.
///
/// Returns nothing retained: the subscriber installs itself process-wide.
/// Call once, from the composition root, before any other logging.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();
}

/// Initialize logging to both stderr and a rolling daily file under
/// `log_dir`. The returned [`WorkerGuard`] must be held for the
/// process's lifetime; dropping it stops the background flush thread.
#[must_use]
pub fn init_with_file_appender(log_dir: &Path, file_prefix: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}
