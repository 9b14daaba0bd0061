//! Tracing subscriber setup shared by the server and client binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Build the default filter directive for a binary.
///
/// `flowsync-server` becomes `flowsync_server=debug,flowsync_shared=debug,tower_http=debug`.
pub fn default_directive(bin_name: &str, level: &str) -> String {
    let crate_name = bin_name.replace('-', "_");
    format!("{crate_name}={level},flowsync_shared={level},tower_http={level}")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default directive. Calling this more
/// than once is harmless; later calls are ignored.
pub fn setup_logger(bin_name: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(bin_name, level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
