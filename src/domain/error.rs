//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated,
//! either while constructing orders or while pricing them against pool
//! reserves.
//!
//! # Examples
//!
//! ```
//! use trigger_swap::domain::error::DomainError;
//! use trigger_swap::domain::deviation::percentage_change;
//! use alloy_primitives::U256;
//!
//! let result = percentage_change(U256::from(99u64), U256::ZERO);
//! assert!(matches!(result, Err(DomainError::ZeroTarget)));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Deviation is undefined against a zero target.
    #[error("target buy amount must be greater than zero")]
    ZeroTarget,

    /// Sell amounts must be positive.
    #[error("{field} must be greater than zero")]
    ZeroAmount {
        /// Name of the offending amount.
        field: &'static str,
    },

    /// An amount string was not an unsigned decimal integer.
    #[error("invalid amount for {field}: {value}")]
    InvalidAmount {
        /// Name of the offending amount.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A token or wallet address was malformed.
    #[error("invalid address for {field}: {value}")]
    InvalidAddress {
        /// Name of the offending address.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// Slippage must be non-negative.
    #[error("slippage must not be negative, got {value}")]
    NegativeSlippage {
        /// The rejected slippage.
        value: Decimal,
    },

    /// Slippage set through order settings has a floor.
    #[error("slippage {value} is below the minimum of {minimum}")]
    SlippageBelowMinimum {
        /// The rejected slippage.
        value: Decimal,
        /// Smallest accepted slippage.
        minimum: Decimal,
    },

    /// Order status only moves forward from `active`.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Only active orders record execution attempts.
    #[error("order is {status}, not active")]
    NotActive {
        /// Current status.
        status: &'static str,
    },

    /// No trade of the order is waiting for its receipt.
    #[error("order has no trade awaiting a receipt")]
    NoPendingTrade,

    /// Unknown order kind tag.
    #[error("unknown order kind: {0}")]
    UnknownKind(String),

    /// Unknown order status tag.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// The pool has no reserves on one side or the output rounds to zero.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The input amount is zero.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// Intermediate swap arithmetic exceeded 256 bits.
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

impl DomainError {
    /// True for the errors that mean the pool cannot fill the trade.
    #[must_use]
    pub fn is_liquidity(&self) -> bool {
        matches!(
            self,
            Self::InsufficientLiquidity | Self::InsufficientInputAmount
        )
    }
}
