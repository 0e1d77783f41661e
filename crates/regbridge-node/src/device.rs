//! Actuator and sensor device-file handles.

use regbridge_core::LedState;
use std::path::{Path, PathBuf};

/// Handle to the LED actuator device file.
///
/// The driver accepts a single `'0'`/`'1'` character on write and reports
/// the pin state as the same single character on read.
#[derive(Debug, Clone)]
pub struct LedDevice {
    path: PathBuf,
}

impl LedDevice {
    /// Create a handle for the given device file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying device file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drive the actuator to `state`.
    ///
    /// # Errors
    ///
    /// Returns error if the device file cannot be written.
    pub async fn write_state(&self, state: LedState) -> Result<(), DeviceError> {
        tokio::fs::write(&self.path, state.as_str())
            .await
            .map_err(|source| DeviceError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Read the actuator's current observed state.
    ///
    /// # Errors
    ///
    /// Returns error if the device file cannot be read or reports a value
    /// outside the `'0'`/`'1'` vocabulary.
    pub async fn read_state(&self) -> Result<LedState, DeviceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DeviceError::Io {
                path: self.path.clone(),
                source,
            })?;

        LedState::parse(&raw).map_err(|_| DeviceError::BadState(raw.trim().to_string()))
    }
}

/// Handle to the sensor device file.
#[derive(Debug, Clone)]
pub struct SensorDevice {
    path: PathBuf,
}

impl SensorDevice {
    /// Create a handle for the given device file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying device file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform one raw read of the sensor output.
    ///
    /// # Errors
    ///
    /// Returns error if the device file cannot be read.
    pub async fn read_raw(&self) -> Result<String, DeviceError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DeviceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Errors produced by device-file I/O.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device file could not be accessed
    #[error("device {path}: {source}")]
    Io {
        /// Device file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The device reported a value outside its vocabulary
    #[error("unexpected device state: {0:?}")]
    BadState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn led_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let led = LedDevice::new(dir.path().join("led0"));

        led.write_state(LedState::On).await.unwrap();
        assert_eq!(led.read_state().await.unwrap(), LedState::On);

        led.write_state(LedState::Off).await.unwrap();
        assert_eq!(led.read_state().await.unwrap(), LedState::Off);
    }

    #[tokio::test]
    async fn led_read_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led0");
        std::fs::write(&path, "x").unwrap();

        let led = LedDevice::new(&path);
        assert!(matches!(
            led.read_state().await,
            Err(DeviceError::BadState(_))
        ));
    }

    #[tokio::test]
    async fn missing_device_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sensor = SensorDevice::new(dir.path().join("dht11"));

        assert!(matches!(
            sensor.read_raw().await,
            Err(DeviceError::Io { .. })
        ));
    }
}
