//! Register store client with timeout and reconnect-once retry.

use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::client::{tcp, Client, Context, Reader, Writer};
use tokio_modbus::Slave;

/// Register store connection settings.
#[derive(Debug, Clone)]
pub struct RegisterStoreConfig {
    /// TCP address of the store, `host:port`
    pub addr: String,
    /// Modbus unit (slave) identifier
    pub unit_id: u8,
    /// Per-call timeout; a stalled link must not wedge the loop
    pub timeout: Duration,
}

impl Default for RegisterStoreConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:502".to_string(),
            unit_id: 1,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Client for the addressable register array.
///
/// Holds at most one connection; operations reconnect lazily when the
/// connection is closed and retry once before giving up.
pub struct RegisterStore {
    config: RegisterStoreConfig,
    ctx: Option<Context>,
}

impl RegisterStore {
    /// Create a client without connecting.
    #[must_use]
    pub fn new(config: RegisterStoreConfig) -> Self {
        Self { config, ctx: None }
    }

    /// Establish the connection.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the store is unreachable
    /// within the configured timeout.
    pub async fn connect(&mut self) -> Result<(), StoreError> {
        let addr: SocketAddr = self
            .config
            .addr
            .parse()
            .map_err(|e| StoreError::Connect(format!("invalid address {}: {e}", self.config.addr)))?;

        let slave = Slave(self.config.unit_id);
        let ctx = tokio::time::timeout(self.config.timeout, tcp::connect_slave(addr, slave))
            .await
            .map_err(|_| StoreError::Timeout {
                op: "connect",
                timeout: self.config.timeout,
            })?
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        tracing::info!(addr = %self.config.addr, unit_id = self.config.unit_id, "Connected to register store");
        self.ctx = Some(ctx);
        Ok(())
    }

    /// Write one holding register.
    ///
    /// # Errors
    ///
    /// Returns error after the reconnect-and-retry-once policy is exhausted.
    pub async fn write_register(&mut self, address: u16, value: u16) -> Result<(), StoreError> {
        if let Err(first) = self.write_once(address, value).await {
            tracing::warn!(address, value, error = %first, "Register write failed, reconnecting for retry");
            self.ctx = None;
            self.write_once(address, value).await?;
        }
        tracing::debug!(address, value, "Register written");
        Ok(())
    }

    /// Read one holding register.
    ///
    /// # Errors
    ///
    /// Returns error after the reconnect-and-retry-once policy is exhausted.
    pub async fn read_register(&mut self, address: u16) -> Result<u16, StoreError> {
        match self.read_once(address).await {
            Ok(value) => Ok(value),
            Err(first) => {
                tracing::warn!(address, error = %first, "Register read failed, reconnecting for retry");
                self.ctx = None;
                self.read_once(address).await
            }
        }
    }

    /// Release the connection cleanly.
    pub async fn disconnect(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            if let Err(e) = ctx.disconnect().await {
                tracing::warn!(error = %e, "Register store disconnect failed");
            }
        }
    }

    async fn ensure_connected(&mut self) -> Result<&mut Context, StoreError> {
        if self.ctx.is_none() {
            self.connect().await?;
        }
        self.ctx
            .as_mut()
            .ok_or_else(|| StoreError::Connect("connection unavailable".to_string()))
    }

    async fn write_once(&mut self, address: u16, value: u16) -> Result<(), StoreError> {
        let timeout = self.config.timeout;
        let ctx = self.ensure_connected().await?;

        tokio::time::timeout(timeout, ctx.write_single_register(address, value))
            .await
            .map_err(|_| StoreError::Timeout {
                op: "write",
                timeout,
            })?
            .map_err(|e| StoreError::Write(e.to_string()))?
            .map_err(|e| StoreError::Write(format!("exception: {e:?}")))?;

        Ok(())
    }

    async fn read_once(&mut self, address: u16) -> Result<u16, StoreError> {
        let timeout = self.config.timeout;
        let ctx = self.ensure_connected().await?;

        let registers = tokio::time::timeout(timeout, ctx.read_holding_registers(address, 1))
            .await
            .map_err(|_| StoreError::Timeout { op: "read", timeout })?
            .map_err(|e| StoreError::Read(e.to_string()))?
            .map_err(|e| StoreError::Read(format!("exception: {e:?}")))?;

        registers
            .first()
            .copied()
            .ok_or_else(|| StoreError::Read("empty response".to_string()))
    }
}

/// Errors produced by register store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Connection could not be established
    #[error("connect error: {0}")]
    Connect(String),
    /// An operation exceeded the configured timeout
    #[error("{op} timed out after {timeout:?}")]
    Timeout {
        /// Operation name
        op: &'static str,
        /// Configured bound
        timeout: Duration,
    },
    /// Read failed or was rejected by the store
    #[error("read error: {0}")]
    Read(String),
    /// Write failed or was rejected by the store
    #[error("write error: {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = RegisterStoreConfig::default();
        assert_eq!(config.addr, "127.0.0.1:502");
        assert_eq!(config.unit_id, 1);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn connect_invalid_address_fails() {
        let mut store = RegisterStore::new(RegisterStoreConfig {
            addr: "not-an-address".to_string(),
            ..Default::default()
        });

        let result = store.connect().await;
        assert!(matches!(result, Err(StoreError::Connect(_))));
    }

    #[tokio::test]
    async fn write_against_unreachable_store_reports_error() {
        // Port 1 is near-certainly closed; both the first attempt and the
        // retry fail at the connect step.
        let mut store = RegisterStore::new(RegisterStoreConfig {
            addr: "127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(200),
            ..Default::default()
        });

        let result = store.write_register(4, 23).await;
        assert!(result.is_err());
    }
}
