//! Diagnostic tracing for the portal.
//!
//! Fetch failures, decode failures (with url and raw payload), and
//! reconciliation outcomes are emitted as `tracing` events. Output goes to
//! stderr so command output on stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to [`DEFAULT_FILTER`].
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=portal=debug portal courses --session session.json
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
