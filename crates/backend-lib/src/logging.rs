// ============================
// assetreg-backend-lib/src/logging.rs
// ============================
//! Tracing subscriber setup.
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, Settings};

/// Filter from `RUST_LOG`, falling back to the configured level
fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_ascii_lowercase()))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));
    match settings.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }
    Ok(())
}
