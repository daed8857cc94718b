//! Diagnostic tracing for the rewriter.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The pass summary and
//! per-file lines are product output and are printed to stdout by the CLI
//! regardless of the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`.
///
/// # Example
/// ```bash
/// RUST_LOG=rewriter=debug rewriter --dry-run cmake .
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
