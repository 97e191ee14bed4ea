//! Shared helpers for unit tests

use tracing_subscriber::EnvFilter;

/// Route tracing output through the test harness writer
///
/// Honours `RUST_LOG` (default `info`). Only the first call installs the
/// subscriber; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
