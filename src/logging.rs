use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Called once from the hosting
/// process; never a load-time side effect.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
