//! Tracing subscriber setup.

use crate::config::LogConfig;
use crate::error::{ApiClientError, ClientResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once, before any request is made.
///
/// `RUST_LOG` wins over `log.filter`. Output goes to stderr so stdout stays
/// free for command results.
pub fn init(config: &LogConfig) -> ClientResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ApiClientError::Config(format!("invalid log filter: {}", e)))?;

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let plain_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init()
        .map_err(|e| ApiClientError::Config(format!("Failed to init subscriber: {}", e)))?;

    tracing::debug!(filter = %config.filter, json = config.json, "Telemetry initialized");
    Ok(())
}
