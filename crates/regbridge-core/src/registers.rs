//! Register addressing and value narrowing.

use serde::Deserialize;

/// Mapping of semantic fields onto holding-register addresses.
///
/// Fixed for the lifetime of a bridge instance; configurable at startup,
/// never negotiated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegisterMap {
    /// Register holding the truncated temperature
    pub temperature: u16,
    /// Register holding the truncated humidity
    pub humidity: u16,
    /// Control/LED read-back register
    pub control: u16,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            temperature: 4,
            humidity: 5,
            control: 6,
        }
    }
}

/// Narrow a decimal sensor value to register width.
///
/// Truncates toward zero rather than rounding; real-valued sensor data is
/// stored in integer-width registers and the fraction is dropped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_register(value: f64) -> u16 {
    value as u16
}
