use std::str::FromStr;

use serversee_config::LoggingConfig;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` overrides the level picked
/// from the configuration.
pub fn init_subscriber(config: &LoggingConfig) {
    let level = if config.debug { "debug" } else { "info" };
    let directives =
        format!("serversee={level},serversee_client={level},serversee_config={level}");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(&directives))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_level(true)
        .with_ansi(config.use_color)
        .with_target(config.show_target)
        .with_writer(std::io::stderr);

    // The timer is part of the layer's type, hence the two branches
    let fmt_layer = if config.show_timestamp {
        fmt_layer.boxed()
    } else {
        fmt_layer.without_time().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
