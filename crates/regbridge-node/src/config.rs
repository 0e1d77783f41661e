//! Node configuration.

use anyhow::{Context, Result};
use regbridge_proto::TopicSet;
use std::path::PathBuf;
use std::time::Duration;

/// Node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// MQTT broker URL
    pub mqtt_broker: String,

    /// Base client id; a UUID suffix is appended at connect time
    pub client_id: String,

    /// Topic set shared with the bridge
    pub topics: TopicSet,

    /// LED actuator device file
    pub led_device: PathBuf,

    /// Sensor device file
    pub sensor_device: PathBuf,

    /// Sleep between acquisition cycles
    pub cycle_interval: Duration,

    /// Sensor read attempts per cycle
    pub read_attempts: u32,

    /// Delay between failed sensor read attempts
    pub retry_delay: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            mqtt_broker: "tcp://localhost:1883".to_string(),
            client_id: "regbridge-node".to_string(),
            topics: TopicSet::default(),
            led_device: PathBuf::from("/dev/led0"),
            sensor_device: PathBuf::from("/dev/dht11"),
            cycle_interval: Duration::from_secs(10),
            read_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REGBRIDGE_MQTT_BROKER`: MQTT broker URL
    /// - `REGBRIDGE_NODE_CLIENT_ID`: base MQTT client id
    /// - `REGBRIDGE_TOPICS`: JSON topic overrides
    /// - `REGBRIDGE_LED_DEVICE`: LED device file path
    /// - `REGBRIDGE_SENSOR_DEVICE`: sensor device file path
    /// - `REGBRIDGE_CYCLE_INTERVAL_SECS`: acquisition cycle period
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(broker) = std::env::var("REGBRIDGE_MQTT_BROKER") {
            config.mqtt_broker = broker;
        }

        if let Ok(client_id) = std::env::var("REGBRIDGE_NODE_CLIENT_ID") {
            config.client_id = client_id;
        }

        if let Ok(topics) = std::env::var("REGBRIDGE_TOPICS") {
            config.topics =
                serde_json::from_str(&topics).context("Invalid REGBRIDGE_TOPICS JSON")?;
        }

        if let Ok(path) = std::env::var("REGBRIDGE_LED_DEVICE") {
            config.led_device = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("REGBRIDGE_SENSOR_DEVICE") {
            config.sensor_device = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("REGBRIDGE_CYCLE_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .context("Invalid REGBRIDGE_CYCLE_INTERVAL_SECS")?;
            config.cycle_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
