//! LED command and state values.

use std::fmt;

/// State of the LED actuator, doubling as the command vocabulary.
///
/// The control surface accepts exactly two values; anything else on the
/// command channel is rejected without side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    /// LED off (`"0"` on the wire)
    Off,
    /// LED on (`"1"` on the wire)
    On,
}

impl LedState {
    /// Parse a command or device read-back payload.
    ///
    /// # Errors
    ///
    /// Returns error for any payload other than `"0"` or `"1"`.
    pub fn parse(payload: &str) -> Result<Self, CommandError> {
        match payload.trim() {
            "0" => Ok(Self::Off),
            "1" => Ok(Self::On),
            other => Err(CommandError::InvalidCommand(other.to_string())),
        }
    }

    /// Wire form of the state, a single character.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by command parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Payload was not one of the accepted command values
    #[error("invalid command value: {0:?}")]
    InvalidCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accepted_values() {
        assert_eq!(LedState::parse("0").unwrap(), LedState::Off);
        assert_eq!(LedState::parse("1").unwrap(), LedState::On);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(LedState::parse("1\n").unwrap(), LedState::On);
    }

    #[test]
    fn rejects_other_values() {
        for bad in ["2", "on", "", "10"] {
            assert!(matches!(
                LedState::parse(bad),
                Err(CommandError::InvalidCommand(_))
            ));
        }
    }

    #[test]
    fn wire_form_roundtrip() {
        assert_eq!(LedState::parse(LedState::On.as_str()).unwrap(), LedState::On);
        assert_eq!(LedState::Off.to_string(), "0");
    }
}
