//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the order store,
//! the chain, key material and the real-time channel.

pub mod chain;
pub mod channel;
pub mod keys;
pub mod store;
