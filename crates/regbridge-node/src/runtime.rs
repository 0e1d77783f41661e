//! Node runtime orchestration.

use crate::acquisition;
use crate::config::NodeConfig;
use crate::device::{DeviceError, LedDevice, SensorDevice};
use anyhow::{Context, Result};
use regbridge_core::LedState;
use regbridge_proto::{parse_broker_url, TelemetryPayload};
use rumqttc::{AsyncClient, ConnectionError, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// The telemetry source runtime.
///
/// Owns the desired actuator state and both device handles. Commands and
/// the periodic cycle are multiplexed onto this single task, so a
/// command-triggered write and a reconciliation-triggered write can never
/// interleave on the physical device.
pub struct Node {
    config: NodeConfig,
    led: LedDevice,
    sensor: SensorDevice,
    desired: LedState,
}

impl Node {
    /// Create a node runtime.
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        let led = LedDevice::new(&config.led_device);
        let sensor = SensorDevice::new(&config.sensor_device);
        Self {
            config,
            led,
            sensor,
            desired: LedState::Off,
        }
    }

    /// Run the node's main loop.
    ///
    /// # Errors
    ///
    /// Returns error only for startup failures: unreachable devices or an
    /// unparseable broker URL. Everything after startup is logged and
    /// retried, never fatal.
    pub async fn run(mut self) -> Result<()> {
        // Startup is the only terminal failure point
        tokio::fs::metadata(&self.config.led_device)
            .await
            .with_context(|| format!("LED device {} unavailable", self.config.led_device.display()))?;
        tokio::fs::metadata(&self.config.sensor_device)
            .await
            .with_context(|| {
                format!(
                    "Sensor device {} unavailable",
                    self.config.sensor_device.display()
                )
            })?;

        let (host, port) =
            parse_broker_url(&self.config.mqtt_broker).context("Invalid MQTT broker URL")?;

        let client_id = format!("{}-{}", self.config.client_id, Uuid::new_v4());
        let mut mqtt_options = MqttOptions::new(client_id, host, port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, 100);

        tracing::info!(
            broker = %self.config.mqtt_broker,
            control = %self.config.topics.control,
            "Node running"
        );

        let mut ticker = tokio::time::interval(self.config.cycle_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = eventloop.poll() => {
                    self.handle_event(event, &client).await;
                }

                _ = ticker.tick() => {
                    self.run_cycle(&client).await;
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        let _ = client.disconnect().await;
        tracing::info!("Node stopped");
        Ok(())
    }

    /// Dispatch one MQTT event.
    async fn handle_event(&mut self, event: Result<Event, ConnectionError>, client: &AsyncClient) {
        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic == self.config.topics.control {
                    self.handle_command(&publish.payload, client).await;
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("Connected to MQTT broker");
                // Subscriptions do not survive a clean-session reconnect;
                // re-issue on every ConnAck
                if let Err(e) = client
                    .subscribe(&self.config.topics.control, QoS::AtLeastOnce)
                    .await
                {
                    tracing::error!(error = %e, "Control subscribe failed");
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT error");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }

    /// Handle an inbound control command.
    ///
    /// Invalid values are discarded with no state change. Valid commands are
    /// applied to the device, recorded as desired state, and echoed as a
    /// status update regardless of the periodic loop.
    async fn handle_command(&mut self, payload: &[u8], client: &AsyncClient) {
        let text = String::from_utf8_lossy(payload);
        let command = match LedState::parse(&text) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding invalid command");
                return;
            }
        };

        if let Err(e) = self.apply_command(command, client).await {
            tracing::error!(%command, error = %e, "Command handling failed");
        }
    }

    async fn apply_command(&mut self, command: LedState, client: &AsyncClient) -> Result<()> {
        self.led.write_state(command).await?;
        let observed = self.led.read_state().await?;
        self.desired = command;

        client
            .publish(
                &self.config.topics.status,
                QoS::AtMostOnce,
                false,
                observed.as_str(),
            )
            .await
            .context("Status publish failed")?;

        tracing::info!(%command, %observed, "Command applied, status published");
        Ok(())
    }

    /// One acquisition + reconciliation cycle.
    ///
    /// A failed sensor read never blocks reconciliation.
    async fn run_cycle(&mut self, client: &AsyncClient) {
        let reading = acquisition::acquire_with_retry(
            &self.sensor,
            self.config.read_attempts,
            self.config.retry_delay,
        )
        .await;

        if let Some(reading) = reading {
            let payload = TelemetryPayload::encode(&reading);
            match client
                .publish(&self.config.topics.telemetry, QoS::AtMostOnce, false, payload)
                .await
            {
                Ok(()) => tracing::debug!(
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    "Telemetry published"
                ),
                Err(e) => tracing::warn!(error = %e, "Telemetry publish failed"),
            }
        }

        if let Err(e) = self.reconcile().await {
            tracing::warn!(error = %e, "Reconciliation failed");
        }
    }

    /// Compare observed actuator state against desired and re-apply on
    /// mismatch. Guards against external state loss without an explicit
    /// command. An unparseable observed state counts as a mismatch.
    async fn reconcile(&mut self) -> Result<(), DeviceError> {
        let observed = match self.led.read_state().await {
            Ok(observed) => Some(observed),
            Err(DeviceError::BadState(raw)) => {
                tracing::warn!(state = %raw, "Actuator reports unreadable state");
                None
            }
            Err(e) => return Err(e),
        };

        if observed != Some(self.desired) {
            tracing::warn!(
                ?observed,
                desired = %self.desired,
                "Actuator state drifted, restoring"
            );
            self.led.write_state(self.desired).await?;
        }
        Ok(())
    }
}
