//! Builders for domain primitives used across tests.
//!
//! Provides concise factories for [`Order`], [`Wallet`] and pair reserves so
//! tests focus on assertions rather than construction boilerplate.

use alloy_primitives::{Address, U256};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::id::{OrderId, UserId, WalletId};
use crate::domain::order::{NewOrder, Order, OrderKind, OrderState, OrderStatus};
use crate::domain::quote::PairReserves;
use crate::domain::token::SellToken;
use crate::domain::wallet::Wallet;

/// Sell token used by default in built orders.
pub fn sell_token() -> Address {
    Address::repeat_byte(0x11)
}

/// Buy token used by default in built orders.
pub fn buy_token() -> Address {
    Address::repeat_byte(0x22)
}

/// Wallet whose key material is `<id>.json`.
pub fn wallet(id: &str) -> Wallet {
    let byte = id.bytes().fold(0x30u8, |acc, b| acc.wrapping_add(b));
    Wallet::new(WalletId::new(id), Address::repeat_byte(byte), format!("{id}.json"))
}

/// Reserves under which selling `amount_in` yields exactly `output`.
///
/// `amount_in` must be a multiple of 1000: with `k = amount_in / 1000`,
/// `R_in = 997k` and `R_out = 2 * output`.
pub fn reserves_for_output(amount_in: u64, output: u64) -> PairReserves {
    let k = U256::from(amount_in / 1000);
    PairReserves::new(U256::from(997u64) * k, U256::from(2u64) * U256::from(output))
}

/// Builder for [`Order`] values in any state.
///
/// Defaults: market order of user `user-1`, selling 1000 units of
/// [`sell_token`] for a target of 100 units of [`buy_token`], active,
/// version 0.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: OrderId,
    owner: UserId,
    wallet: Wallet,
    kind: OrderKind,
    sell: SellToken,
    sell_amount: U256,
    buy_token: Address,
    target: U256,
    slippage: Option<Decimal>,
    status: OrderStatus,
    version: i64,
}

impl OrderBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(id),
            owner: UserId::new("user-1"),
            wallet: wallet("wallet-1"),
            kind: OrderKind::Market,
            sell: SellToken::new(sell_token(), 18, "SELL"),
            sell_amount: U256::from(1000u64),
            buy_token: buy_token(),
            target: U256::from(100u64),
            slippage: None,
            status: OrderStatus::Active,
            version: 0,
        }
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.owner = UserId::new(owner);
        self
    }

    pub fn wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = wallet;
        self
    }

    pub fn kind(mut self, kind: OrderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn sell_token(mut self, address: Address) -> Self {
        self.sell.address = address;
        self
    }

    pub fn sell_amount(mut self, amount: u64) -> Self {
        self.sell_amount = U256::from(amount);
        self
    }

    pub fn buy_token(mut self, address: Address) -> Self {
        self.buy_token = address;
        self
    }

    pub fn target(mut self, target: u64) -> Self {
        self.target = U256::from(target);
        self
    }

    pub fn slippage(mut self, slippage: Decimal) -> Self {
        self.slippage = Some(slippage);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Build without validation, so invalid states can be tested too.
    pub fn build(self) -> Order {
        Order::restore(
            self.id,
            NewOrder {
                owner: self.owner,
                sell: self.sell,
                sell_amount: self.sell_amount,
                buy_token: self.buy_token,
                target_buy_amount: self.target,
                slippage: self.slippage,
                kind: self.kind,
            },
            self.wallet,
            OrderState {
                status: self.status,
                trades: Vec::new(),
                version: self.version,
                created_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
            },
        )
    }
}
