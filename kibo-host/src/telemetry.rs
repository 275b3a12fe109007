//! Tracing subscriber initialisation.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter. Overrides the configured `general.log_level`. |
//! | `KIBO_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::Result;

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "KIBO_LOG_FORMAT";

/// Install the global `tracing` subscriber.
///
/// `default_level` is used when `RUST_LOG` is unset or unparsable.
///
/// # Errors
/// Returns [`crate::HostError::LogFilter`] if `default_level` is not a valid
/// filter, or [`crate::HostError::Telemetry`] if a subscriber is already set.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };
    let use_json = std::env::var(LOG_FORMAT_ENV).as_deref() == Ok("json");

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?;
    }

    tracing::debug!(json = use_json, "Tracing initialised");
    Ok(())
}
