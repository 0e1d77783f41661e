//! Bounded-retry sensor acquisition.

use crate::device::{DeviceError, SensorDevice};
use regbridge_core::{ReadingError, TelemetryReading};
use std::time::Duration;

/// Perform one acquisition: read the device and validate the output.
///
/// # Errors
///
/// Returns error on device I/O failure, schema violations, or out-of-range
/// values. Never panics past this boundary.
pub async fn acquire(sensor: &SensorDevice) -> Result<TelemetryReading, AcquireError> {
    let raw = sensor.read_raw().await?;
    parse_sensor_output(&raw)
}

/// Acquire with the node's bounded retry policy.
///
/// On failure, retries up to `attempts` total reads with `retry_delay`
/// between them. Exhaustion yields `None`: the cycle emits no telemetry but
/// must still proceed to reconciliation.
pub async fn acquire_with_retry(
    sensor: &SensorDevice,
    attempts: u32,
    retry_delay: Duration,
) -> Option<TelemetryReading> {
    for attempt in 1..=attempts {
        match acquire(sensor).await {
            Ok(reading) => {
                tracing::debug!(
                    attempt,
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    "Sensor read ok"
                );
                return Some(reading);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Sensor read failed");
                if attempt < attempts {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    tracing::error!(attempts, "Sensor unreadable this cycle, skipping telemetry");
    None
}

/// Parse the sensor's raw output against its strict schema.
///
/// Three required `key: value` lines: two decimals (`humidity`,
/// `temperature`, unit suffixes tolerated) and one hexadecimal `checksum`.
///
/// # Errors
///
/// Returns error on missing fields, malformed values, or out-of-range
/// readings.
pub fn parse_sensor_output(raw: &str) -> Result<TelemetryReading, AcquireError> {
    let mut humidity = None;
    let mut temperature = None;
    let mut checksum = None;

    for line in raw.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "humidity" => humidity = Some(parse_decimal("humidity", value)?),
            "temperature" => temperature = Some(parse_decimal("temperature", value)?),
            "checksum" => checksum = Some(parse_hex_checksum(value)?),
            _ => {}
        }
    }

    let humidity = humidity.ok_or(AcquireError::MissingField("humidity"))?;
    let temperature = temperature.ok_or(AcquireError::MissingField("temperature"))?;
    let checksum = checksum.ok_or(AcquireError::MissingField("checksum"))?;

    Ok(TelemetryReading::new(temperature, humidity, checksum)?)
}

/// Parse a decimal field, tolerating a trailing unit suffix (`%`, `°C`).
fn parse_decimal(field: &'static str, value: &str) -> Result<f64, AcquireError> {
    let digits = value.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    digits.parse().map_err(|_| AcquireError::Malformed {
        field,
        value: value.to_string(),
    })
}

fn parse_hex_checksum(value: &str) -> Result<u8, AcquireError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| AcquireError::Malformed {
            field: "checksum",
            value: value.to_string(),
        })?;

    u8::from_str_radix(digits, 16).map_err(|_| AcquireError::Malformed {
        field: "checksum",
        value: value.to_string(),
    })
}

/// Errors produced by one acquisition attempt.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// Device I/O failed
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// A required field was absent from the sensor output
    #[error("sensor output missing field '{0}'")]
    MissingField(&'static str),
    /// A field was present but unparseable
    #[error("sensor field '{field}' malformed: {value:?}")]
    Malformed {
        /// Field name
        field: &'static str,
        /// Offending value text
        value: String,
    },
    /// Values parsed but failed range validation
    #[error(transparent)]
    OutOfRange(#[from] ReadingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_output_with_units() {
        let reading =
            parse_sensor_output("Humidity: 65.0%\nTemperature: 25.3°C\nChecksum: 0x5D\n").unwrap();
        assert_eq!(reading.humidity, 65.0);
        assert_eq!(reading.temperature, 25.3);
        assert_eq!(reading.checksum, 0x5D);
    }

    #[test]
    fn humidity_above_bound_is_invalid() {
        let result = parse_sensor_output("humidity: 101.0\ntemperature: 25.0\nchecksum: 0x00");
        assert!(matches!(result, Err(AcquireError::OutOfRange(_))));
    }

    #[test]
    fn temperature_above_bound_is_invalid() {
        let result = parse_sensor_output("humidity: 60.0\ntemperature: 51.0\nchecksum: 0x00");
        assert!(matches!(result, Err(AcquireError::OutOfRange(_))));
    }

    #[test]
    fn missing_checksum_is_invalid() {
        let result = parse_sensor_output("humidity: 60.0\ntemperature: 25.0");
        assert!(matches!(
            result,
            Err(AcquireError::MissingField("checksum"))
        ));
    }

    #[test]
    fn driver_error_text_is_invalid() {
        let result = parse_sensor_output("sensor read failed\ncheck dmesg for details\n");
        assert!(matches!(result, Err(AcquireError::MissingField(_))));
    }

    #[tokio::test]
    async fn retry_exhaustion_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let sensor = SensorDevice::new(dir.path().join("missing"));

        let result = acquire_with_retry(&sensor, 3, Duration::from_millis(1)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn acquire_reads_device_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dht11");
        std::fs::write(&path, "Humidity: 65.0%\nTemperature: 25.3°C\nChecksum: 0x5D\n").unwrap();

        let sensor = SensorDevice::new(&path);
        let reading = acquire(&sensor).await.unwrap();
        assert_eq!(reading.temperature, 25.3);
    }
}
