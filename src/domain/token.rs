//! Token references and on-chain amount parsing.

use std::str::FromStr;

use alloy_primitives::{Address, U256};

use super::error::DomainError;

/// The token an order sells, with display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellToken {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl SellToken {
    pub fn new(address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.into(),
        }
    }
}

/// Parse a hex address. Case is not significant.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAddress`] naming `field`.
pub fn parse_address(field: &'static str, raw: &str) -> Result<Address, DomainError> {
    Address::from_str(&raw.trim().to_ascii_lowercase()).map_err(|_| DomainError::InvalidAddress {
        field,
        value: raw.to_string(),
    })
}

/// Lower-case `0x`-prefixed rendering used for persistence.
#[must_use]
pub fn address_key(address: &Address) -> String {
    format!("{address:#x}")
}

/// Parse an exact amount in the token's smallest unit from a decimal string.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] naming `field`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<U256, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidAmount {
            field,
            value: raw.to_string(),
        });
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| DomainError::InvalidAmount {
        field,
        value: raw.to_string(),
    })
}
