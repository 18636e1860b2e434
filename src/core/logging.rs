//! Diagnostic logging setup.
//!
//! Operator-facing results are printed to stdout by each job. Everything routed
//! through `tracing` goes to stderr so it never mixes into those result lines.
//! Per-document write decisions are emitted under the `audit` target at `debug`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "makoto_tools=info,makoto=info";

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`;
/// `RUST_LOG=audit=debug` shows every prospective or applied update.
///
/// Calling this twice is harmless: the second call leaves the first subscriber
/// in place.
pub fn init_logger(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
