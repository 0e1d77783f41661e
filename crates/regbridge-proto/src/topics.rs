//! MQTT topic set for one bridge instance.

use serde::Deserialize;

/// The three fixed channels shared by the node and the bridge.
///
/// No wildcard routing; each side subscribes to exactly the topics it
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopicSet {
    /// Sensor readings, node → bridge
    pub telemetry: String,
    /// Control change-notifications, bridge → node
    pub control: String,
    /// Observed actuator state, node → observers
    pub status: String,
}

impl Default for TopicSet {
    fn default() -> Self {
        Self {
            telemetry: "data/sensor".to_string(),
            control: "led/control".to_string(),
            status: "led/status".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topics() {
        let topics = TopicSet::default();
        assert_eq!(topics.telemetry, "data/sensor");
        assert_eq!(topics.control, "led/control");
        assert_eq!(topics.status, "led/status");
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let topics: TopicSet =
            serde_json::from_str(r#"{"telemetry": "site-a/data/sensor"}"#).unwrap();
        assert_eq!(topics.telemetry, "site-a/data/sensor");
        assert_eq!(topics.control, "led/control");
    }
}
