//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing
///
/// `RUST_LOG` takes precedence; otherwise `level` applies to every target.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}
