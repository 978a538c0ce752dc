use tracing::Level;
use tracing_subscriber::{
    filter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Structured JSON event stream. ERROR-level events go to stderr, everything
/// else to stdout, so error output can be captured separately.
pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warehouse_etl=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warehouse_etl=info"))
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_filter(filter::filter_fn(|meta| *meta.level() != Level::ERROR));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter::filter_fn(|meta| *meta.level() == Level::ERROR));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(stderr_layer)
        .init();
}
