//! # regbridge Bridge
//!
//! Translation bridge between the event-driven telemetry channel and the
//! polled register store.
//!
//! ## Data path
//!
//! 1. **Ingest**: subscribe to the telemetry topic, decode the text payload
//! 2. **Translate**: truncate values and write the temperature and humidity
//!    registers (both must succeed or the update is abandoned)
//! 3. **Reflect**: read the control register back and republish its value,
//!    but only when it differs from the last value actually forwarded
//!
//! Each message is fully processed before the next is accepted; a slow
//! register store serializes telemetry processing by design of the loop.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod config;
mod runtime;

pub use config::BridgeConfig;
pub use runtime::Bridge;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting regbridge bridge"
    );

    let config = BridgeConfig::from_env()?;
    let bridge = Bridge::new(config);

    bridge.run().await?;

    Ok(())
}
