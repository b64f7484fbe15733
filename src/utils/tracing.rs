//! Subscriber setup for debug builds.
//!
//! Everything here is compiled only with the `debug-tracing` feature; without
//! it both initializers are no-ops and events go nowhere.

#[cfg(feature = "debug-tracing")]
use std::{path::Path, sync::Mutex};

#[cfg(feature = "debug-tracing")]
use tracing_appender::non_blocking::WorkerGuard;
#[cfg(feature = "debug-tracing")]
use tracing_subscriber::EnvFilter;

/// Keeps the file writer flushing until the process exits.
#[cfg(feature = "debug-tracing")]
static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

#[cfg(feature = "debug-tracing")]
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("layout_fixer=trace"))
}

/// Logs to stderr, filtered by `RUST_LOG`. Ignored in release builds and
/// when a global subscriber is already set.
#[cfg(feature = "debug-tracing")]
pub fn init_tracing() {
    if !cfg!(debug_assertions) {
        return;
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_level(true)
        .with_target(true);

    if subscriber.try_init().is_ok() {
        tracing::info!("tracing initialized");
    }
}

/// Logs to hourly rolling files `layout-fixer.log.*` under `dir`.
///
/// Returns `false` if another subscriber is already installed.
#[cfg(feature = "debug-tracing")]
pub fn init_file_tracing(dir: &Path) -> bool {
    let appender = tracing_appender::rolling::hourly(dir, "layout-fixer.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        if let Ok(mut slot) = FILE_GUARD.lock() {
            *slot = Some(guard);
        }
        tracing::info!(dir = %dir.display(), "file tracing initialized");
    }
    installed
}

#[cfg(not(feature = "debug-tracing"))]
pub fn init_tracing() {}

#[cfg(not(feature = "debug-tracing"))]
pub fn init_file_tracing(_dir: &std::path::Path) -> bool {
    false
}
