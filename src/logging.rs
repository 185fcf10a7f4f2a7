use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global subscriber: compact lines on stderr, filtered by
/// `RUST_LOG`. Calling it twice is an error from the second call on.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    init_with(DEFAULT_LOG_FILTER)
}

pub fn init_with(default_filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry().with(filter).with(fmt).try_init()
}
