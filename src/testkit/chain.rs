//! Scripted [`ChainClient`] for exercising the scheduler without a node.
//!
//! Reserves, allowance, gas estimates and receipts are configured up front;
//! each phase can be made to fail with a given [`ChainError`]. Calls are
//! counted so tests can assert on what was sent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::quote::PairReserves;
use crate::domain::wallet::PrivateKey;
use crate::error::ChainError;
use crate::port::outbound::chain::{ChainClient, SwapCall, TxHandle, TxReceipt};

/// A submitted swap as seen by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSwap {
    pub call: SwapCall,
    pub gas_limit: u64,
    pub tx_hash: TxHash,
}

pub struct ScriptedChain {
    wrapped_native: Address,
    reserves: Mutex<HashMap<(Address, Address), PairReserves>>,
    default_reserves: Mutex<Option<PairReserves>>,
    allowance: Mutex<U256>,
    gas_estimate: AtomicU64,
    quote_failure: Mutex<Option<ChainError>>,
    approval_failure: Mutex<Option<ChainError>>,
    estimate_failure: Mutex<Option<ChainError>>,
    submit_failure: Mutex<Option<ChainError>>,
    revert_receipts: AtomicBool,
    receipt_delay: Mutex<Duration>,
    receipt_failure: Mutex<Option<ChainError>>,
    receipt_lookups: AtomicUsize,
    quotes: AtomicUsize,
    approvals: AtomicUsize,
    estimates: AtomicUsize,
    submitted: Mutex<Vec<SubmittedSwap>>,
    next_hash: AtomicU64,
}

impl Default for ScriptedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedChain {
    /// Unlimited allowance, 100k gas, no reserves configured.
    pub fn new() -> Self {
        Self {
            wrapped_native: Address::repeat_byte(0xee),
            reserves: Mutex::new(HashMap::new()),
            default_reserves: Mutex::new(None),
            allowance: Mutex::new(U256::MAX),
            gas_estimate: AtomicU64::new(100_000),
            quote_failure: Mutex::new(None),
            approval_failure: Mutex::new(None),
            estimate_failure: Mutex::new(None),
            submit_failure: Mutex::new(None),
            revert_receipts: AtomicBool::new(false),
            receipt_delay: Mutex::new(Duration::ZERO),
            receipt_failure: Mutex::new(None),
            receipt_lookups: AtomicUsize::new(0),
            quotes: AtomicUsize::new(0),
            approvals: AtomicUsize::new(0),
            estimates: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            next_hash: AtomicU64::new(1),
        }
    }

    /// Reserves returned for the `sell`/`buy` pair.
    pub fn set_reserves(&self, sell: Address, buy: Address, reserves: PairReserves) {
        self.reserves.lock().insert((sell, buy), reserves);
    }

    /// Reserves returned for any pair without specific reserves.
    pub fn set_default_reserves(&self, reserves: PairReserves) {
        *self.default_reserves.lock() = Some(reserves);
    }

    pub fn set_allowance(&self, allowance: U256) {
        *self.allowance.lock() = allowance;
    }

    pub fn set_gas_estimate(&self, gas: u64) {
        self.gas_estimate.store(gas, Ordering::SeqCst);
    }

    pub fn fail_quotes(&self, err: ChainError) {
        *self.quote_failure.lock() = Some(err);
    }

    pub fn fail_approval(&self, err: ChainError) {
        *self.approval_failure.lock() = Some(err);
    }

    pub fn fail_estimate(&self, err: ChainError) {
        *self.estimate_failure.lock() = Some(err);
    }

    pub fn fail_submit(&self, err: ChainError) {
        *self.submit_failure.lock() = Some(err);
    }

    /// Mine every subsequent transaction as reverted.
    pub fn revert_receipts(&self) {
        self.revert_receipts.store(true, Ordering::SeqCst);
    }

    /// Delay every receipt by `delay`.
    pub fn set_receipt_delay(&self, delay: Duration) {
        *self.receipt_delay.lock() = delay;
    }

    /// Fail every receipt wait with `err`; lookups report "not mined yet".
    pub fn withhold_receipts(&self, err: ChainError) {
        *self.receipt_failure.lock() = Some(err);
    }

    /// Undo [`Self::withhold_receipts`].
    pub fn release_receipts(&self) {
        *self.receipt_failure.lock() = None;
    }

    pub fn receipt_lookups(&self) -> usize {
        self.receipt_lookups.load(Ordering::SeqCst)
    }

    pub fn quotes(&self) -> usize {
        self.quotes.load(Ordering::SeqCst)
    }

    pub fn approvals(&self) -> usize {
        self.approvals.load(Ordering::SeqCst)
    }

    pub fn estimates(&self) -> usize {
        self.estimates.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().len()
    }

    pub fn submitted(&self) -> Vec<SubmittedSwap> {
        self.submitted.lock().clone()
    }

    fn fresh_hash(&self) -> TxHash {
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);
        TxHash::left_padding_from(&n.to_be_bytes())
    }

    fn mined(&self, tx_hash: TxHash) -> TxReceipt {
        TxReceipt {
            tx_hash,
            success: !self.revert_receipts.load(Ordering::SeqCst),
            block_number: Some(1),
            gas_used: self.gas_estimate.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn pair_reserves(&self, sell: Address, buy: Address) -> Result<PairReserves, ChainError> {
        self.quotes.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.quote_failure.lock().clone() {
            return Err(err);
        }
        let specific = self.reserves.lock().get(&(sell, buy)).copied();
        specific
            .or(*self.default_reserves.lock())
            .ok_or_else(|| ChainError::PairNotFound {
                sell: format!("{sell:#x}"),
                buy: format!("{buy:#x}"),
            })
    }

    async fn allowance(&self, _owner: Address, _token: Address) -> Result<U256, ChainError> {
        Ok(*self.allowance.lock())
    }

    async fn approve_max(
        &self,
        _key: &PrivateKey,
        _token: Address,
    ) -> Result<TxReceipt, ChainError> {
        self.approvals.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.approval_failure.lock().clone() {
            return Err(err);
        }
        *self.allowance.lock() = U256::MAX;
        Ok(self.mined(self.fresh_hash()))
    }

    async fn estimate_gas(&self, _key: &PrivateKey, _call: &SwapCall) -> Result<u64, ChainError> {
        self.estimates.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.estimate_failure.lock().clone() {
            return Err(err);
        }
        Ok(self.gas_estimate.load(Ordering::SeqCst))
    }

    async fn submit(
        &self,
        _key: &PrivateKey,
        call: &SwapCall,
        gas_limit: u64,
    ) -> Result<TxHandle, ChainError> {
        if let Some(err) = self.submit_failure.lock().clone() {
            return Err(err);
        }
        let tx_hash = self.fresh_hash();
        self.submitted.lock().push(SubmittedSwap {
            call: call.clone(),
            gas_limit,
            tx_hash,
        });
        Ok(TxHandle { tx_hash })
    }

    async fn receipt(&self, tx: &TxHandle) -> Result<Option<TxReceipt>, ChainError> {
        self.receipt_lookups.fetch_add(1, Ordering::SeqCst);
        if self.receipt_failure.lock().is_some() {
            return Ok(None);
        }
        Ok(Some(self.mined(tx.tx_hash)))
    }

    async fn await_receipt(&self, tx: &TxHandle) -> Result<TxReceipt, ChainError> {
        if let Some(err) = self.receipt_failure.lock().clone() {
            return Err(err);
        }
        let delay = *self.receipt_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.mined(tx.tx_hash))
    }

    fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }
}
