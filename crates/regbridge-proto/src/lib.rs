//! # regbridge Protocol
//!
//! MQTT topic set and wire payload codec.
//!
//! ## Payloads
//!
//! Telemetry is a text payload of newline-separated `key: value` lines with
//! case-insensitive keys:
//!
//! ```text
//! humidity: 65.0
//! temperature: 25.3
//! Checksum: 0x5D
//! ```
//!
//! Commands and status updates are single-character payloads (`"0"`/`"1"`);
//! control change-notifications are the decimal string of the register value.
//!
//! ## Topics
//!
//! Three fixed channels per bridge instance: telemetry in, control out,
//! status out. Defaults match the deployed broker layout and can be
//! overridden at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod broker;
pub mod payload;
pub mod topics;

pub use broker::{parse_broker_url, BrokerUrlError};
pub use payload::{PayloadError, TelemetryPayload};
pub use topics::TopicSet;
