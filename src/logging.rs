use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "producer_consumer=info";

/// Installs the global `tracing` subscriber.
///
/// Reads `RUST_LOG` and falls back to info-level output for this crate.
/// Diagnostics go to stderr, leaving stdout to the sent/received stream.
/// Calling it more than once is harmless.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
