//! Tracing/logging setup shared by services, tests, and benches.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing.
///
/// Honors `RUST_LOG`; defaults to `info` for the engine's crates. Safe to
/// call multiple times - subsequent calls are no-ops, so tests can call it
/// unconditionally.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bindery=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init();
}
