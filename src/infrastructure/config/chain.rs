//! Chain endpoint and contract addresses.

use alloy_primitives::Address;
use serde::Deserialize;

use crate::domain::token::parse_address;
use crate::error::{ConfigError, Result};

/// Uniswap-V2 style deployment to trade against.
///
/// `rpc_url` may be overridden with the `RPC_URL` environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default)]
    pub router_address: String,
    #[serde(default)]
    pub factory_address: String,
    #[serde(default)]
    pub wrapped_native_address: String,
}

fn default_chain_id() -> u64 {
    1
}

/// Parsed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainAddresses {
    pub router: Address,
    pub factory: Address,
    pub wrapped_native: Address,
}

impl ChainConfig {
    /// Parse and check the configured addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the malformed field.
    pub fn addresses(&self) -> Result<ChainAddresses> {
        Ok(ChainAddresses {
            router: address("router_address", &self.router_address)?,
            factory: address("factory_address", &self.factory_address)?,
            wrapped_native: address("wrapped_native_address", &self.wrapped_native_address)?,
        })
    }

    /// Parse the RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when empty and
    /// [`ConfigError::InvalidValue`] when it is not a URL.
    pub fn rpc_url(&self) -> Result<url::Url> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        self.rpc_url
            .trim()
            .parse()
            .map_err(|e: url::ParseError| {
                ConfigError::InvalidValue {
                    field: "rpc_url",
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

fn address(field: &'static str, raw: &str) -> Result<Address> {
    if raw.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    parse_address(field, raw).map_err(|e| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}
