//! Bridge runtime orchestration.

use crate::config::BridgeConfig;
use anyhow::{Context, Result};
use regbridge_adapter_modbus::RegisterStore;
use regbridge_core::{expected_checksum, to_register, ChangeTracker, RegisterMap};
use regbridge_proto::{parse_broker_url, TelemetryPayload};
use rumqttc::{AsyncClient, ConnectionError, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use uuid::Uuid;

/// The translation bridge runtime.
pub struct Bridge {
    config: BridgeConfig,
    store: RegisterStore,
    tracker: ChangeTracker,
}

impl Bridge {
    /// Create a bridge runtime.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let store = RegisterStore::new(config.store.clone());
        Self {
            config,
            store,
            tracker: ChangeTracker::new(),
        }
    }

    /// Run the bridge's main loop.
    ///
    /// # Errors
    ///
    /// Returns error only when the initial register store connection cannot
    /// be established or the broker URL is unparseable. Per-message
    /// failures are logged and the message abandoned, never fatal.
    pub async fn run(mut self) -> Result<()> {
        self.store
            .connect()
            .await
            .context("Failed to connect to register store")?;

        let (host, port) =
            parse_broker_url(&self.config.mqtt_broker).context("Invalid MQTT broker URL")?;

        let client_id = format!("{}-{}", self.config.client_id, Uuid::new_v4());
        let mut mqtt_options = MqttOptions::new(client_id, host, port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, 100);

        tracing::info!(
            broker = %self.config.mqtt_broker,
            telemetry = %self.config.topics.telemetry,
            control = %self.config.topics.control,
            "Bridge running"
        );

        loop {
            tokio::select! {
                event = eventloop.poll() => {
                    self.handle_event(event, &client).await;
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        let _ = client.disconnect().await;
        self.store.disconnect().await;
        tracing::info!("Bridge stopped");
        Ok(())
    }

    /// Dispatch one MQTT event.
    async fn handle_event(&mut self, event: Result<Event, ConnectionError>, client: &AsyncClient) {
        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic != self.config.topics.telemetry {
                    return;
                }
                // Fully process each message before accepting the next;
                // backpressure on a slow store is intended.
                if let Err(e) = self.handle_telemetry(&publish.payload, client).await {
                    tracing::warn!(error = %e, "Telemetry update abandoned");
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("Connected to MQTT broker");
                // Subscriptions do not survive a clean-session reconnect;
                // re-issue on every ConnAck
                if let Err(e) = client
                    .subscribe(&self.config.topics.telemetry, QoS::AtLeastOnce)
                    .await
                {
                    tracing::error!(error = %e, "Telemetry subscribe failed");
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT error");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }

    /// Process one telemetry message end to end: parse, dual register
    /// write, control read-back, change-detection publish.
    async fn handle_telemetry(&mut self, payload: &[u8], client: &AsyncClient) -> Result<()> {
        let text = String::from_utf8_lossy(payload);
        let parsed = match TelemetryPayload::parse(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed telemetry");
                return Ok(());
            }
        };

        if !checksum_acceptable(&parsed, self.config.verify_checksum) {
            tracing::warn!(
                checksum = ?parsed.checksum,
                "Discarding telemetry with missing or mismatched checksum"
            );
            return Ok(());
        }

        // Two independent writes; both must succeed or the whole update is
        // abandoned with no partial retry.
        let [(temp_addr, temp_value), (hum_addr, hum_value)] =
            register_writes(&parsed, &self.config.registers);

        self.store
            .write_register(temp_addr, temp_value)
            .await
            .context("Temperature register write failed")?;
        self.store
            .write_register(hum_addr, hum_value)
            .await
            .context("Humidity register write failed")?;

        tracing::debug!(
            temperature = temp_value,
            humidity = hum_value,
            "Registers updated from telemetry"
        );

        // A failed read leaves the tracker untouched, so the next successful
        // read is judged against the last published value.
        let control = self
            .store
            .read_register(self.config.registers.control)
            .await
            .context("Control register read failed")?;

        if self.tracker.needs_publish(control) {
            client
                .publish(
                    &self.config.topics.control,
                    QoS::AtLeastOnce,
                    false,
                    control.to_string(),
                )
                .await
                .context("Control publish failed")?;
            self.tracker.mark_published(control);
            tracing::info!(control, "Control change published");
        } else {
            tracing::debug!(control, "Control value unchanged, publish suppressed");
        }

        Ok(())
    }
}

/// The two register writes for one accepted telemetry payload, as
/// `(address, value)` pairs: temperature first, then humidity. Values are
/// truncated, not rounded.
fn register_writes(payload: &TelemetryPayload, map: &RegisterMap) -> [(u16, u16); 2] {
    [
        (map.temperature, to_register(payload.temperature)),
        (map.humidity, to_register(payload.humidity)),
    ]
}

/// Checksum gate for inbound telemetry.
///
/// With verification off every payload passes; with it on, the payload must
/// carry a checksum matching the one recomputed from its values.
fn checksum_acceptable(payload: &TelemetryPayload, verify: bool) -> bool {
    if !verify {
        return true;
    }
    payload.checksum == Some(expected_checksum(payload.humidity, payload.temperature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn offline_client(capacity: usize) -> AsyncClient {
        // Never polled; requests only enqueue into the bounded channel.
        let options = MqttOptions::new("test", "localhost", 1883);
        AsyncClient::new(options, capacity).0
    }

    fn failing_store_bridge(addr: &str) -> Bridge {
        let mut config = BridgeConfig::default();
        config.store.addr = addr.to_string();
        config.store.timeout = Duration::from_millis(200);
        Bridge::new(config)
    }

    /// Register store that answers exactly one write, then goes away.
    async fn one_shot_register_server() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // A write-single-register request is 12 bytes (MBAP + PDU) and
            // its success response is a byte-for-byte echo
            let mut frame = [0u8; 12];
            socket.read_exact(&mut frame).await.unwrap();
            socket.write_all(&frame).await.unwrap();
            // Dropping socket and listener closes the connection and
            // refuses the reconnect attempt
        });

        addr
    }

    #[test]
    fn writes_are_truncated_to_mapped_addresses() {
        let payload = TelemetryPayload {
            humidity: 65.9,
            temperature: 23.7,
            checksum: None,
        };

        let writes = register_writes(&payload, &RegisterMap::default());
        assert_eq!(writes, [(4, 23), (5, 65)]);
    }

    #[test]
    fn custom_map_is_respected() {
        let payload = TelemetryPayload {
            humidity: 50.0,
            temperature: 20.0,
            checksum: None,
        };
        let map = RegisterMap {
            temperature: 10,
            humidity: 11,
            control: 12,
        };

        assert_eq!(register_writes(&payload, &map), [(10, 20), (11, 50)]);
    }

    #[test]
    fn checksum_ignored_when_verification_off() {
        let payload = TelemetryPayload {
            humidity: 65.0,
            temperature: 25.0,
            checksum: Some(0xFF),
        };
        assert!(checksum_acceptable(&payload, false));

        let without = TelemetryPayload {
            checksum: None,
            ..payload
        };
        assert!(checksum_acceptable(&without, false));
    }

    #[test]
    fn checksum_enforced_when_verification_on() {
        let good = TelemetryPayload {
            humidity: 65.2,
            temperature: 25.3,
            checksum: Some(65 + 2 + 25 + 3),
        };
        assert!(checksum_acceptable(&good, true));

        let bad = TelemetryPayload {
            checksum: Some(0x00),
            ..good
        };
        assert!(!checksum_acceptable(&bad, true));

        let missing = TelemetryPayload {
            checksum: None,
            ..good
        };
        assert!(!checksum_acceptable(&missing, true));
    }

    #[test]
    fn malformed_payload_plans_no_writes() {
        // Parsing fails before any store access, so a payload missing a
        // required field can never reach the write path.
        assert!(TelemetryPayload::parse("temperature: 25.0").is_err());
        assert!(TelemetryPayload::parse("humidity: abc\ntemperature: 25.0").is_err());
    }

    #[tokio::test]
    async fn connack_reissues_subscription() {
        // Capacity of one so the enqueued re-subscribe is observable; the
        // event loop stays alive so the request channel stays open
        let options = MqttOptions::new("test", "localhost", 1883);
        let (client, _eventloop) = AsyncClient::new(options, 1);
        let mut bridge = Bridge::new(BridgeConfig::default());

        let connack = ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        };
        bridge
            .handle_event(Ok(Event::Incoming(Packet::ConnAck(connack))), &client)
            .await;

        // The single request slot now holds the re-subscribe
        assert!(client
            .try_publish("extra/topic", QoS::AtMostOnce, false, "")
            .is_err());
    }

    #[tokio::test]
    async fn unreachable_store_abandons_update_without_publish() {
        let mut bridge = failing_store_bridge("127.0.0.1:1");
        let client = offline_client(10);

        let result = bridge
            .handle_telemetry(b"humidity: 65.0\ntemperature: 25.3\nChecksum: 0x5D", &client)
            .await;

        assert!(result.is_err());
        assert_eq!(bridge.tracker.last_published(), None);
    }

    #[tokio::test]
    async fn second_write_failure_abandons_update_without_publish() {
        // Temperature write succeeds, humidity write hits a dead connection
        // and a refused reconnect: the update is abandoned with no partial
        // retry and nothing published.
        let addr = one_shot_register_server().await;
        let mut bridge = failing_store_bridge(&addr.to_string());
        let client = offline_client(10);

        let result = bridge
            .handle_telemetry(b"humidity: 65.0\ntemperature: 25.3\nChecksum: 0x5D", &client)
            .await;

        assert!(result.is_err());
        assert_eq!(bridge.tracker.last_published(), None);
    }
}
