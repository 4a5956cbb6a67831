//! Chain access port: pair reserves, approvals and swap transactions.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::domain::quote::PairReserves;
use crate::domain::wallet::PrivateKey;
use crate::error::ChainError;

/// Router entry point used for a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMethod {
    /// `swapExactTokensForTokens`
    ExactTokensForTokens,
    /// `swapExactTokensForETH`, unwrapping the wrapped native token.
    ExactTokensForEth,
}

impl SwapMethod {
    /// Pick the method once from the buy token.
    #[must_use]
    pub fn for_buy_token(buy: Address, wrapped_native: Address) -> Self {
        if buy == wrapped_native {
            Self::ExactTokensForEth
        } else {
            Self::ExactTokensForTokens
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactTokensForTokens => "swapExactTokensForTokens",
            Self::ExactTokensForEth => "swapExactTokensForETH",
        }
    }
}

/// A fully parameterised exact-input router call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCall {
    pub method: SwapMethod,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub recipient: Address,
    /// Unix timestamp after which the router rejects the call.
    pub deadline: u64,
}

/// A submitted, not yet confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub tx_hash: TxHash,
}

/// A mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Port for the AMM router and its tokens.
///
/// Implementations hold the router, factory and wrapped-native addresses.
/// Methods that send transactions sign with the given key.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Reserves of the `sell`/`buy` pair, oriented to the sell side.
    ///
    /// # Errors
    ///
    /// [`ChainError::PairNotFound`] when the factory has no such pair.
    async fn pair_reserves(&self, sell: Address, buy: Address) -> Result<PairReserves, ChainError>;

    /// ERC-20 allowance granted by `owner` to the router.
    async fn allowance(&self, owner: Address, token: Address) -> Result<U256, ChainError>;

    /// Approve the router for `U256::MAX` of `token` and wait for the receipt.
    async fn approve_max(&self, key: &PrivateKey, token: Address)
        -> Result<TxReceipt, ChainError>;

    /// Estimate gas for the swap as sent from the key's address.
    async fn estimate_gas(&self, key: &PrivateKey, call: &SwapCall) -> Result<u64, ChainError>;

    /// Sign and broadcast the swap with an explicit gas limit.
    async fn submit(
        &self,
        key: &PrivateKey,
        call: &SwapCall,
        gas_limit: u64,
    ) -> Result<TxHandle, ChainError>;

    /// Receipt of the transaction if it has been mined, without waiting.
    async fn receipt(&self, tx: &TxHandle) -> Result<Option<TxReceipt>, ChainError>;

    /// Wait until the transaction is mined. Transient transport errors are
    /// retried.
    async fn await_receipt(&self, tx: &TxHandle) -> Result<TxReceipt, ChainError>;

    /// Wrapped native token; buying it routes through `swapExactTokensForETH`.
    fn wrapped_native(&self) -> Address;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buying_wrapped_native_unwraps() {
        let weth = Address::repeat_byte(0xee);
        assert_eq!(
            SwapMethod::for_buy_token(weth, weth),
            SwapMethod::ExactTokensForEth
        );
        assert_eq!(
            SwapMethod::for_buy_token(Address::repeat_byte(0x01), weth),
            SwapMethod::ExactTokensForTokens
        );
    }
}
