//! Trigger Swap - adaptive execution scheduler for conditional AMM swap orders.
//!
//! Users place orders to sell a fixed amount of one token for another once
//! the market price reaches a target. The scheduler keeps a pool of
//! periodic workers, each owning a slice of the active orders, prices every
//! order against the pair reserves, and submits the swap when the trigger
//! rule for the order kind fires.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Orders, token amounts, deviation and trigger rules
//! - **`port`** - Traits for the store, the chain, keys and the real-time channel
//! - **`application`** - Pricing, evaluation, execution, workers and the pool
//! - **`adapter`** - SQLite store, EVM client, keystore, session hub and the CLI
//! - **`infrastructure`** - Configuration, wiring and the runtime lifecycle
//!
//! # Features
//!
//! - `evm` (default) - Alloy-backed chain client and keystore decryption
//! - `testkit` - In-memory adapters and builders for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
