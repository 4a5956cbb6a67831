//! Price evaluation of orders against live pair reserves.

use std::sync::Arc;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::domain::deviation::percentage_change;
use crate::domain::error::DomainError;
use crate::domain::order::Order;
use crate::domain::quote::{minimum_output, PairReserves};
use crate::error::Result;
use crate::port::outbound::chain::ChainClient;

/// Result of pricing one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedOrder {
    pub quoted_output: U256,
    pub minimum_output: U256,
    /// Deviation of the quote from the target, in percent.
    pub change: Decimal,
}

impl PricedOrder {
    /// Price `order` against already fetched reserves.
    ///
    /// # Errors
    ///
    /// Liquidity errors from the pool math and [`DomainError::ZeroTarget`].
    pub fn from_reserves(
        order: &Order,
        reserves: &PairReserves,
    ) -> std::result::Result<Self, DomainError> {
        let quoted_output = reserves.amount_out(order.sell_amount)?;
        let minimum_output = minimum_output(quoted_output, order.slippage())?;
        let change = percentage_change(quoted_output, order.target_buy_amount)?;
        Ok(Self {
            quoted_output,
            minimum_output,
            change,
        })
    }
}

/// Fetches reserves through the chain port and prices orders.
#[derive(Clone)]
pub struct PriceEvaluator {
    chain: Arc<dyn ChainClient>,
}

impl PriceEvaluator {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Quoted output, minimum output and deviation for `order`.
    ///
    /// # Errors
    ///
    /// Chain errors while reading reserves and domain errors from pricing.
    pub async fn price(&self, order: &Order) -> Result<PricedOrder> {
        let reserves = self
            .chain
            .pair_reserves(order.sell.address, order.buy_token)
            .await?;
        Ok(PricedOrder::from_reserves(order, &reserves)?)
    }

    /// Quoted output only, used for broadcasting live rates.
    ///
    /// # Errors
    ///
    /// Chain errors while reading reserves and liquidity errors.
    pub async fn quote(&self, order: &Order) -> Result<U256> {
        let reserves = self
            .chain
            .pair_reserves(order.sell.address, order.buy_token)
            .await?;
        Ok(reserves.amount_out(order.sell_amount)?)
    }
}
