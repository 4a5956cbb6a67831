//! EVM chain adapter for Uniswap-V2 style routers.
//!
//! Reads pair reserves through the factory, manages ERC-20 approvals and
//! signs router swaps with the order wallet's key.

pub mod client;
pub mod contracts;
mod error;

pub use client::EvmChainClient;
