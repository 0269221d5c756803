use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr.
///
/// Use the `RUST_LOG` environment variable to override the default filter,
/// which only lets warnings through so program output stays clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
