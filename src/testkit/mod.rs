//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for orders, wallets and pair reserves.
//! - [`store`] - In-memory [`OrderStore`](crate::port::outbound::store::OrderStore).
//! - [`chain`] - Scripted [`ChainClient`](crate::port::outbound::chain::ChainClient).
//! - [`keys`] - Static key resolver.
//! - [`channel`] - Recording real-time channel.
//! - [`config`] - Canonical test configurations.
//! - [`harness`] - All of the above wired into the scheduler.

pub mod chain;
pub mod channel;
pub mod config;
pub mod domain;
pub mod harness;
pub mod keys;
pub mod store;
