//! Console logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logger(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = if json {
        registry
            .with(fmt::layer().json().with_ansi(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_ansi(true))
            .try_init()
    };
}
