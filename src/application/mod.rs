//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters: pricing
//! and triggering orders, executing swaps, running the adaptive worker pool
//! and broadcasting live quotes.

pub mod broadcast;
pub mod claims;
pub mod classify;
pub mod evaluation;
pub mod execution;
pub mod pool;
pub mod pricing;
pub mod service;
pub mod worker;
