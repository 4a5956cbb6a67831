//! Conditional swap orders.
//!
//! An [`Order`] sells an exact amount of one token for another once the live
//! quote falls inside the trigger window of its [`OrderKind`]. Status only
//! ever moves forward from [`OrderStatus::Active`]. Executed trades are
//! append-only except that a trade awaiting its receipt is resolved in place.
//! Every successful save bumps the version used for optimistic concurrency.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OrderId, UserId};
use super::token::SellToken;
use super::wallet::Wallet;

/// Slippage percent applied when an order is created without one.
pub const DEFAULT_SLIPPAGE: Decimal = dec!(0.05);

/// Smallest slippage percent accepted through order settings.
pub const MIN_SETTINGS_SLIPPAGE: Decimal = dec!(0.5);

/// Trigger family of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    #[serde(rename = "market")]
    Market,
    #[serde(rename = "stop-loss", alias = "sl")]
    StopLoss,
    #[serde(rename = "take-profit", alias = "tp")]
    TakeProfit,
}

impl OrderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::StopLoss => "stop-loss",
            Self::TakeProfit => "take-profit",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(Self::Market),
            "stop-loss" | "sl" => Ok(Self::StopLoss),
            "take-profit" | "tp" => Ok(Self::TakeProfit),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

/// Lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Cancelled,
    Filled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Filled => "filled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            "filled" => Ok(Self::Filled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// One on-chain execution attempt recorded against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedTrade {
    pub hash: String,
    pub executed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error prefix of a submitted trade whose receipt is not known yet.
pub const RECEIPT_PENDING: &str = "receipt pending";

impl ExecutedTrade {
    /// True while the swap was submitted but its receipt never confirmed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.starts_with(RECEIPT_PENDING))
    }
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner: UserId,
    pub sell: SellToken,
    pub sell_amount: U256,
    pub buy_token: Address,
    pub target_buy_amount: U256,
    pub slippage: Option<Decimal>,
    pub kind: OrderKind,
}

/// Persisted lifecycle state used when rehydrating an order.
#[derive(Debug, Clone)]
pub struct OrderState {
    pub status: OrderStatus,
    pub trades: Vec<ExecutedTrade>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// A conditional swap order with its wallet joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub owner: UserId,
    pub wallet: Wallet,
    pub sell: SellToken,
    pub sell_amount: U256,
    pub buy_token: Address,
    pub target_buy_amount: U256,
    pub kind: OrderKind,
    pub created_at: DateTime<Utc>,
    slippage: Decimal,
    status: OrderStatus,
    trades: Vec<ExecutedTrade>,
    version: i64,
}

impl Order {
    /// Create a new active order.
    ///
    /// # Errors
    ///
    /// Rejects a zero sell amount, a zero target and negative slippage.
    pub fn open(
        id: OrderId,
        draft: NewOrder,
        wallet: Wallet,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if draft.sell_amount.is_zero() {
            return Err(DomainError::ZeroAmount {
                field: "sell_amount",
            });
        }
        if draft.target_buy_amount.is_zero() {
            return Err(DomainError::ZeroTarget);
        }
        let slippage = draft.slippage.unwrap_or(DEFAULT_SLIPPAGE);
        if slippage.is_sign_negative() && !slippage.is_zero() {
            return Err(DomainError::NegativeSlippage { value: slippage });
        }

        Ok(Self::restore(
            id,
            NewOrder {
                slippage: Some(slippage),
                ..draft
            },
            wallet,
            OrderState {
                status: OrderStatus::Active,
                trades: Vec::new(),
                version: 0,
                created_at: now,
            },
        ))
    }

    /// Rebuild an order from persisted state without validation.
    pub fn restore(id: OrderId, draft: NewOrder, wallet: Wallet, state: OrderState) -> Self {
        Self {
            id,
            owner: draft.owner,
            wallet,
            sell: draft.sell,
            sell_amount: draft.sell_amount,
            buy_token: draft.buy_token,
            target_buy_amount: draft.target_buy_amount,
            kind: draft.kind,
            created_at: state.created_at,
            slippage: draft.slippage.unwrap_or(DEFAULT_SLIPPAGE),
            status: state.status,
            trades: state.trades,
            version: state.version,
        }
    }

    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    #[must_use]
    pub fn slippage(&self) -> Decimal {
        self.slippage
    }

    #[must_use]
    pub fn trades(&self) -> &[ExecutedTrade] {
        &self.trades
    }

    /// Version loaded from the store; a save must match it.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Mark the order filled by the swap `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] unless the order is active.
    pub fn record_fill(
        &mut self,
        hash: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(OrderStatus::Filled)?;
        self.trades.push(ExecutedTrade {
            hash: hash.into(),
            executed_at: at,
            error: None,
        });
        Ok(())
    }

    /// Record a submitted swap whose receipt could not be confirmed. The
    /// order stays active until the trade is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotActive`] unless the order is active.
    pub fn record_unconfirmed(
        &mut self,
        hash: impl Into<String>,
        at: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::NotActive {
                status: self.status.as_str(),
            });
        }
        self.trades.push(ExecutedTrade {
            hash: hash.into(),
            executed_at: at,
            error: Some(format!("{RECEIPT_PENDING}: {reason}")),
        });
        Ok(())
    }

    /// Latest trade when it still awaits its receipt.
    #[must_use]
    pub fn pending_trade(&self) -> Option<&ExecutedTrade> {
        self.trades.last().filter(|t| t.is_pending())
    }

    /// The pending trade was mined successfully: the order is filled by it.
    ///
    /// # Errors
    ///
    /// [`DomainError::NoPendingTrade`] without a pending trade and
    /// [`DomainError::InvalidTransition`] unless the order is active.
    pub fn confirm_pending(&mut self) -> Result<(), DomainError> {
        if self.pending_trade().is_none() {
            return Err(DomainError::NoPendingTrade);
        }
        self.transition(OrderStatus::Filled)?;
        if let Some(trade) = self.trades.last_mut() {
            trade.error = None;
        }
        Ok(())
    }

    /// The pending trade reverted or was dropped. The order stays active.
    ///
    /// # Errors
    ///
    /// [`DomainError::NoPendingTrade`] without a pending trade.
    pub fn reject_pending(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        match self.trades.last_mut() {
            Some(trade) if trade.is_pending() => {
                trade.error = Some(reason.into());
                Ok(())
            }
            _ => Err(DomainError::NoPendingTrade),
        }
    }

    /// Cancel the order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] unless the order is active.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(OrderStatus::Cancelled)
    }

    /// Change slippage through order settings.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SlippageBelowMinimum`] below 0.5%.
    pub fn set_slippage(&mut self, value: Decimal) -> Result<(), DomainError> {
        if value < MIN_SETTINGS_SLIPPAGE {
            return Err(DomainError::SlippageBelowMinimum {
                value,
                minimum: MIN_SETTINGS_SLIPPAGE,
            });
        }
        self.slippage = value;
        Ok(())
    }

    /// Advance the version after a successful save.
    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), DomainError> {
        if self.status != OrderStatus::Active || to == OrderStatus::Active {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        Ok(())
    }
}
