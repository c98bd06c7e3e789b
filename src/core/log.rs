use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global tracing subscriber. Without `--verbose` only
/// `RUST_LOG` can turn logging on.
pub fn init_logging(verbose: bool) {
    let (app_level, fallback) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(Targets::new().with_target("divtrack", app_level))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();
}
