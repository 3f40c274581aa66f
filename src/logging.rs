// ==========================================
// Logging setup
// ==========================================
// Built on tracing + tracing-subscriber
// Log level comes from the environment
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging
///
/// # Environment
/// - RUST_LOG: level filter (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=skillflow_ledger=trace
///
/// # Example
/// ```no_run
/// use skillflow_ledger::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialise logging for tests
///
/// Debug level through the test writer; safe to call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
