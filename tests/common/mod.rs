//! Shared helpers for the integration tests.

use tracing_subscriber::EnvFilter;

/// Forward the crate's tracing output to the test harness when `RUST_LOG`
/// is set. Every test calls this; `try_init` makes all but the first call
/// a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
