//! Diagnostic tracing for the lookup binary.
//!
//! Library code only emits events; the binary installs the subscriber.
//! Absent values are logged at `debug` at most. Faults mapped to a fallback
//! are logged once, at `warn`, by the fallback helpers.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Stdout stays reserved for the looked-up value, so diagnostics never mix
/// with `lookup get` output.
///
/// ```bash
/// RUST_LOG=lookup=debug lookup get --tree tree.json /content/page1/jcr:content jcr:title
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
