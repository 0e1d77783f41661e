//! Bridge configuration.

use anyhow::{Context, Result};
use regbridge_adapter_modbus::RegisterStoreConfig;
use regbridge_core::RegisterMap;
use regbridge_proto::TopicSet;
use std::time::Duration;

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// MQTT broker URL
    pub mqtt_broker: String,

    /// Base client id; a UUID suffix is appended at connect time
    pub client_id: String,

    /// Topic set shared with the node
    pub topics: TopicSet,

    /// Register store connection settings
    pub store: RegisterStoreConfig,

    /// Semantic field → register address mapping
    pub registers: RegisterMap,

    /// Enforce the telemetry checksum before accepting an update.
    ///
    /// Off by default: the checksum is carried on the wire but the original
    /// deployment never validated it downstream. Turning this on makes a
    /// missing or mismatched checksum behave like a parse failure.
    pub verify_checksum: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mqtt_broker: "tcp://localhost:1883".to_string(),
            client_id: "regbridge-bridge".to_string(),
            topics: TopicSet::default(),
            store: RegisterStoreConfig::default(),
            registers: RegisterMap::default(),
            verify_checksum: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REGBRIDGE_MQTT_BROKER`: MQTT broker URL
    /// - `REGBRIDGE_BRIDGE_CLIENT_ID`: base MQTT client id
    /// - `REGBRIDGE_TOPICS`: JSON topic overrides
    /// - `REGBRIDGE_STORE_ADDR`: register store `host:port`
    /// - `REGBRIDGE_STORE_UNIT_ID`: Modbus unit id
    /// - `REGBRIDGE_STORE_TIMEOUT_MS`: per-call timeout
    /// - `REGBRIDGE_REGISTER_MAP`: JSON register map overrides
    /// - `REGBRIDGE_VERIFY_CHECKSUM`: `1`/`true` to enforce checksums
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(broker) = std::env::var("REGBRIDGE_MQTT_BROKER") {
            config.mqtt_broker = broker;
        }

        if let Ok(client_id) = std::env::var("REGBRIDGE_BRIDGE_CLIENT_ID") {
            config.client_id = client_id;
        }

        if let Ok(topics) = std::env::var("REGBRIDGE_TOPICS") {
            config.topics =
                serde_json::from_str(&topics).context("Invalid REGBRIDGE_TOPICS JSON")?;
        }

        if let Ok(addr) = std::env::var("REGBRIDGE_STORE_ADDR") {
            config.store.addr = addr;
        }

        if let Ok(unit_id) = std::env::var("REGBRIDGE_STORE_UNIT_ID") {
            config.store.unit_id = unit_id.parse().context("Invalid REGBRIDGE_STORE_UNIT_ID")?;
        }

        if let Ok(ms) = std::env::var("REGBRIDGE_STORE_TIMEOUT_MS") {
            let ms: u64 = ms.parse().context("Invalid REGBRIDGE_STORE_TIMEOUT_MS")?;
            config.store.timeout = Duration::from_millis(ms);
        }

        if let Ok(map) = std::env::var("REGBRIDGE_REGISTER_MAP") {
            config.registers =
                serde_json::from_str(&map).context("Invalid REGBRIDGE_REGISTER_MAP JSON")?;
        }

        if let Ok(flag) = std::env::var("REGBRIDGE_VERIFY_CHECKSUM") {
            config.verify_checksum = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}
