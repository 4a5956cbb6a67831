//! Execution engine: approval, swap build, gas, submission, confirmation.
//!
//! Drives one triggered order on chain and records the fill. Failures before
//! submission write nothing. Once a swap is submitted its hash is kept: a
//! confirmation failure records the trade as awaiting its receipt, and the
//! order is not executed again until [`ExecutionEngine::resolve_pending`]
//! settles it.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{TxHash, U256};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::pricing::PricedOrder;
use crate::domain::error::DomainError;
use crate::domain::order::Order;
use crate::domain::wallet::PrivateKey;
use crate::error::{ChainError, ExecutionError, Result, StoreError};
use crate::port::outbound::chain::{ChainClient, SwapCall, SwapMethod, TxHandle, TxReceipt};
use crate::port::outbound::store::OrderStore;

/// Default validity window of a swap call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20 * 60);

/// Default headroom added on top of the gas estimate, in percent.
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 30;

/// Allowances at or above this are treated as unlimited.
#[must_use]
pub fn approval_threshold() -> U256 {
    U256::MAX / U256::from(2u8)
}

/// Gas limit with `buffer_percent` headroom over the estimate.
#[must_use]
pub fn gas_limit(estimate: u64, buffer_percent: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(buffer_percent) / 100)
}

/// Render a transaction hash the way it is persisted.
#[must_use]
pub fn tx_hash_hex(hash: &TxHash) -> String {
    format!("{hash:#x}")
}

/// Tunables for transaction building and confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    pub deadline: Duration,
    pub gas_buffer_percent: u64,
    /// `None` waits for the receipt indefinitely.
    pub receipt_timeout: Option<Duration>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            gas_buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
            receipt_timeout: None,
        }
    }
}

/// Result of the approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Existing allowance already covers any amount.
    AlreadyApproved { allowance: U256 },
    /// An unlimited approval was mined.
    Approved { tx_hash: TxHash },
}

/// What the receipt of a pending trade said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingResolution {
    /// Not mined yet; the order keeps waiting.
    Awaiting,
    /// Mined successfully; carries the saved, filled order.
    Filled(Order),
    /// Reverted; carries the saved order, active again.
    Reverted(Order),
}

/// Submits swaps for triggered orders.
pub struct ExecutionEngine {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn OrderStore>,
    settings: ExecutionSettings,
}

impl ExecutionEngine {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn OrderStore>,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            chain,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Execute `order` at the priced minimum output and persist the fill.
    ///
    /// Returns the saved order (status `filled`, one more trade, advanced
    /// version).
    ///
    /// # Errors
    ///
    /// [`ExecutionError`] for the failing phase, a domain error when the order
    /// is not active, or a store error (including a version conflict) when the
    /// fill cannot be saved.
    pub async fn execute(
        &self,
        order: &Order,
        key: &PrivateKey,
        priced: &PricedOrder,
    ) -> Result<Order> {
        let approval = self.ensure_approval(order, key).await?;
        debug!(order_id = %order.id, approval = ?approval, "Approval checked");

        let call = self.build_call(order, priced, Utc::now().timestamp());
        let estimate = self
            .chain
            .estimate_gas(key, &call)
            .await
            .map_err(ExecutionError::GasEstimation)?;
        let limit = gas_limit(estimate, self.settings.gas_buffer_percent);

        let handle = self
            .chain
            .submit(key, &call, limit)
            .await
            .map_err(ExecutionError::Submission)?;
        let tx_hash = tx_hash_hex(&handle.tx_hash);
        info!(
            order_id = %order.id,
            tx_hash = %tx_hash,
            method = call.method.as_str(),
            gas_limit = limit,
            "Swap submitted"
        );

        let receipt = match self.confirm(&handle).await {
            Ok(receipt) => receipt,
            Err(err) => {
                self.record_unconfirmed(order, &tx_hash, &err).await;
                return Err(err.into());
            }
        };
        if !receipt.success {
            return Err(ExecutionError::Confirmation(ChainError::Reverted { tx_hash }).into());
        }

        let mut filled = order.clone();
        filled.record_fill(tx_hash, Utc::now())?;
        self.store.save(&filled).await
    }

    /// Settle the order's pending trade from a single receipt lookup.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::Confirmation`] when the lookup fails, a domain error
    /// when nothing is pending and a store error when the result cannot be
    /// saved.
    pub async fn resolve_pending(&self, order: &Order) -> Result<PendingResolution> {
        let Some(trade) = order.pending_trade() else {
            return Err(DomainError::NoPendingTrade.into());
        };
        let tx_hash = TxHash::from_str(&trade.hash).map_err(|e| StoreError::Corrupt {
            order_id: order.id.to_string(),
            reason: e.to_string(),
        })?;
        let receipt = self
            .chain
            .receipt(&TxHandle { tx_hash })
            .await
            .map_err(ExecutionError::Confirmation)?;

        match receipt {
            None => Ok(PendingResolution::Awaiting),
            Some(receipt) if receipt.success => {
                let mut filled = order.clone();
                filled.confirm_pending()?;
                Ok(PendingResolution::Filled(self.store.save(&filled).await?))
            }
            Some(_) => {
                let mut released = order.clone();
                released.reject_pending(
                    ChainError::Reverted {
                        tx_hash: trade.hash.clone(),
                    }
                    .to_string(),
                )?;
                Ok(PendingResolution::Reverted(self.store.save(&released).await?))
            }
        }
    }

    /// Make sure the router may spend the order's sell token.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::ApprovalGasInsufficient`] when the provider reports a
    /// gas shortfall, [`ExecutionError::ApprovalFailed`] otherwise.
    pub async fn ensure_approval(
        &self,
        order: &Order,
        key: &PrivateKey,
    ) -> std::result::Result<ApprovalOutcome, ExecutionError> {
        let allowance = self
            .chain
            .allowance(order.wallet.address, order.sell.address)
            .await
            .map_err(approval_error)?;
        if allowance >= approval_threshold() {
            return Ok(ApprovalOutcome::AlreadyApproved { allowance });
        }

        info!(
            order_id = %order.id,
            token = %order.sell.symbol,
            "Approving router for sell token"
        );
        let receipt = self
            .chain
            .approve_max(key, order.sell.address)
            .await
            .map_err(approval_error)?;
        if !receipt.success {
            return Err(ExecutionError::ApprovalFailed(ChainError::Reverted {
                tx_hash: tx_hash_hex(&receipt.tx_hash),
            }));
        }
        Ok(ApprovalOutcome::Approved {
            tx_hash: receipt.tx_hash,
        })
    }

    /// Exact-input router call for `order`, valid until `now + deadline`.
    #[must_use]
    pub fn build_call(&self, order: &Order, priced: &PricedOrder, now: i64) -> SwapCall {
        let now = u64::try_from(now).unwrap_or_default();
        SwapCall {
            method: SwapMethod::for_buy_token(order.buy_token, self.chain.wrapped_native()),
            amount_in: order.sell_amount,
            amount_out_min: priced.minimum_output,
            path: vec![order.sell.address, order.buy_token],
            recipient: order.wallet.address,
            deadline: now.saturating_add(self.settings.deadline.as_secs()),
        }
    }

    async fn record_unconfirmed(&self, order: &Order, tx_hash: &str, err: &ExecutionError) {
        let mut pending = order.clone();
        let recorded = match pending.record_unconfirmed(tx_hash, Utc::now(), &err.to_string()) {
            Ok(()) => self.store.save(&pending).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        match recorded {
            Ok(()) => warn!(
                order_id = %order.id,
                tx_hash = %tx_hash,
                error = %err,
                "Swap submitted but not confirmed, awaiting receipt"
            ),
            Err(e) => error!(
                order_id = %order.id,
                tx_hash = %tx_hash,
                error = %e,
                "Failed to record unconfirmed swap"
            ),
        }
    }

    async fn confirm(&self, handle: &TxHandle) -> std::result::Result<TxReceipt, ExecutionError> {
        let wait = self.chain.await_receipt(handle);
        let receipt = match self.settings.receipt_timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(receipt) => receipt,
                Err(_) => Err(ChainError::ReceiptTimeout {
                    tx_hash: tx_hash_hex(&handle.tx_hash),
                    waited_secs: limit.as_secs(),
                }),
            },
            None => wait.await,
        };
        receipt.map_err(ExecutionError::Confirmation)
    }
}

fn approval_error(err: ChainError) -> ExecutionError {
    if err.is_gas_shortfall() {
        ExecutionError::ApprovalGasInsufficient(err)
    } else {
        ExecutionError::ApprovalFailed(err)
    }
}
