//! Logging bootstrap for recipe-api binaries.

use recipe_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
}

/// Install the global tracing subscriber.
///
/// JSON output is meant for deployed environments, pretty output for local
/// development. Calling this twice is an error reported by the subscriber.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings);

    match settings.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_filter(filter))
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(filter),
            )
            .try_init()?,
    }

    tracing::info!(
        target: "recipe-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );

    Ok(())
}
