//! # Modbus Adapter
//!
//! Thin client for the polled register store, exposing exactly two
//! operations to the bridge: read-one and write-one holding register.
//!
//! ## Failure policy
//!
//! Every call is bounded by a connection-level timeout. A failed operation
//! drops the connection, reconnects, and retries once; a second failure is
//! reported to the caller, who abandons the update for this message.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::{RegisterStore, RegisterStoreConfig, StoreError};
