//! Outbound adapters implementing the port traits.

#[cfg(feature = "evm")]
pub mod evm;
pub mod keystore;
pub mod realtime;
pub mod sqlite;
