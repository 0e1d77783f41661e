//! # regbridge Node
//!
//! Telemetry source runtime for the cross-protocol state bridge.
//!
//! ## Architecture
//!
//! One state-owning task drives three concerns through a single select loop:
//! 1. **Acquisition**: bounded-retry sensor reads published on a fixed period
//! 2. **Reconciliation**: observed vs desired actuator state, re-applied on drift
//! 3. **Command reflection**: inbound control commands applied to the device
//!    and echoed as status updates
//!
//! Running commands and reconciliation on the same task keeps device access
//! serialized without an explicit lock.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod acquisition;
mod config;
mod device;
mod runtime;

pub use config::NodeConfig;
pub use runtime::Node;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting regbridge node"
    );

    let config = NodeConfig::from_env()?;
    let node = Node::new(config);

    node.run().await?;

    Ok(())
}
