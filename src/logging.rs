use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Logs go to stderr: stdout carries protocol traffic in stdio mode. `RUST_LOG`
/// takes precedence over `default_level`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
