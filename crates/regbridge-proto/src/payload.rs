//! Text payload codec for the telemetry channel.

use regbridge_core::TelemetryReading;

/// A telemetry payload as decoded from the wire.
///
/// Only `humidity` and `temperature` are mandatory; the checksum is carried
/// when present so the consumer can decide whether to enforce it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPayload {
    /// Relative humidity in percent
    pub humidity: f64,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Transfer checksum, if the producer included one
    pub checksum: Option<u8>,
}

impl TelemetryPayload {
    /// Decode a payload of newline-separated `key: value` lines.
    ///
    /// Keys are case-insensitive; unknown keys are ignored. A malformed
    /// checksum is treated as absent rather than failing the payload, since
    /// consumers that do not verify checksums never look at the field.
    ///
    /// # Errors
    ///
    /// Returns error if `humidity` or `temperature` is missing or
    /// non-numeric.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let mut humidity = None;
        let mut temperature = None;
        let mut checksum = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "humidity" => humidity = Some(parse_decimal("humidity", value)?),
                "temperature" => temperature = Some(parse_decimal("temperature", value)?),
                "checksum" => checksum = parse_checksum(value),
                _ => {}
            }
        }

        Ok(Self {
            humidity: humidity.ok_or(PayloadError::MissingField("humidity"))?,
            temperature: temperature.ok_or(PayloadError::MissingField("temperature"))?,
            checksum,
        })
    }

    /// Encode a validated reading in the wire format (one fraction digit,
    /// two uppercase hex checksum digits).
    #[must_use]
    pub fn encode(reading: &TelemetryReading) -> String {
        format!(
            "humidity: {:.1}\ntemperature: {:.1}\nChecksum: 0x{:02X}",
            reading.humidity, reading.temperature, reading.checksum
        )
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<f64, PayloadError> {
    value.parse().map_err(|_| PayloadError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_checksum(value: &str) -> Option<u8> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;

    u8::from_str_radix(digits, 16).ok()
}

/// Errors produced by payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// A required field was absent
    #[error("payload missing required field '{0}'")]
    MissingField(&'static str),
    /// A field was present but not numeric
    #[error("field '{field}' is not numeric: {value:?}")]
    InvalidNumber {
        /// Field name
        field: &'static str,
        /// Offending value text
        value: String,
    },
}
