//! Sensor reading model and physical range validation.

/// Maximum humidity the sensor can report, in percent.
pub const MAX_HUMIDITY: f64 = 100.0;

/// Maximum temperature the sensor can report, in degrees Celsius.
pub const MAX_TEMPERATURE: f64 = 50.0;

/// One validated sensor acquisition.
///
/// Values carry one fraction digit of precision on the wire; the checksum
/// is the DHT11 transfer checksum (sum of the four data bytes mod 256).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Transfer checksum as reported by the sensor.
    pub checksum: u8,
}

impl TelemetryReading {
    /// Build a reading, rejecting values outside the sensor's physical range.
    ///
    /// # Errors
    ///
    /// Returns error if humidity exceeds 100.0 or temperature exceeds 50.0.
    pub fn new(temperature: f64, humidity: f64, checksum: u8) -> Result<Self, ReadingError> {
        if humidity > MAX_HUMIDITY || humidity < 0.0 {
            return Err(ReadingError::HumidityOutOfRange(humidity));
        }
        if temperature > MAX_TEMPERATURE || temperature < 0.0 {
            return Err(ReadingError::TemperatureOutOfRange(temperature));
        }
        Ok(Self {
            temperature,
            humidity,
            checksum,
        })
    }

    /// Whether the carried checksum matches the one recomputed from the values.
    #[must_use]
    pub fn checksum_valid(&self) -> bool {
        self.checksum == expected_checksum(self.humidity, self.temperature)
    }
}

/// Recompute the DHT11 transfer checksum from decimal values.
///
/// The sensor transmits humidity and temperature as integer/tenths byte
/// pairs and a checksum that is the byte sum mod 256. Values are taken at
/// one fraction digit, matching the wire encoding.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expected_checksum(humidity: f64, temperature: f64) -> u8 {
    let hum_tenths = (humidity * 10.0).round() as u32;
    let temp_tenths = (temperature * 10.0).round() as u32;
    let sum = hum_tenths / 10 + hum_tenths % 10 + temp_tenths / 10 + temp_tenths % 10;
    (sum % 256) as u8
}

/// Errors produced by reading validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    /// Humidity outside the sensor's physical range
    #[error("humidity {0} out of range (0..=100)")]
    HumidityOutOfRange(f64),
    /// Temperature outside the sensor's physical range
    #[error("temperature {0} out of range (0..=50)")]
    TemperatureOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_values() {
        let reading = TelemetryReading::new(25.3, 65.0, 0x5A).unwrap();
        assert_eq!(reading.temperature, 25.3);
        assert_eq!(reading.humidity, 65.0);
    }

    #[test]
    fn rejects_humidity_above_bound() {
        let result = TelemetryReading::new(25.0, 101.0, 0);
        assert!(matches!(result, Err(ReadingError::HumidityOutOfRange(_))));
    }

    #[test]
    fn rejects_temperature_above_bound() {
        let result = TelemetryReading::new(51.0, 60.0, 0);
        assert!(matches!(
            result,
            Err(ReadingError::TemperatureOutOfRange(_))
        ));
    }

    #[test]
    fn boundary_values_are_valid() {
        assert!(TelemetryReading::new(50.0, 100.0, 0).is_ok());
    }

    #[test]
    fn checksum_matches_byte_sum() {
        // humidity 65.2 -> bytes 65, 2; temperature 25.3 -> bytes 25, 3
        assert_eq!(expected_checksum(65.2, 25.3), 65 + 2 + 25 + 3);
    }

    #[test]
    fn checksum_validity_detects_tampering() {
        let reading = TelemetryReading {
            temperature: 25.3,
            humidity: 65.2,
            checksum: 95,
        };
        assert!(reading.checksum_valid());

        let tampered = TelemetryReading {
            checksum: 96,
            ..reading
        };
        assert!(!tampered.checksum_valid());
    }
}
