//! # regbridge Core
//!
//! Domain model shared by the telemetry node and the translation bridge.
//!
//! This crate provides:
//! - Sensor reading representation with physical range validation
//! - LED command/state values with strict parsing
//! - The fixed register map and the lossy value narrowing rule
//! - Change-detection state for the control read-back channel

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod command;
pub mod reading;
pub mod registers;

pub use change::ChangeTracker;
pub use command::{CommandError, LedState};
pub use reading::{expected_checksum, ReadingError, TelemetryReading};
pub use registers::{to_register, RegisterMap};
