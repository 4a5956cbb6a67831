//! [`ChainClient`] over JSON-RPC for a Uniswap-V2 style deployment.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::network::{
    Ethereum, EthereumWallet, Network, ReceiptResponse, TransactionBuilder,
};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};

use super::contracts::{swap_calldata, IUniswapV2Factory, IUniswapV2Pair, IERC20};
use super::error::{from_contract, from_transport};
use crate::domain::quote::PairReserves;
use crate::domain::token::address_key;
use crate::domain::wallet::PrivateKey;
use crate::error::ChainError;
use crate::infrastructure::config::chain::ChainAddresses;
use crate::port::outbound::chain::{ChainClient, SwapCall, TxHandle, TxReceipt};

type TxRequest = <Ethereum as Network>::TransactionRequest;

/// Chain client for one router deployment.
///
/// A fresh HTTP provider is built per call; signing providers carry the key
/// only for the duration of that call.
pub struct EvmChainClient {
    rpc_url: url::Url,
    chain_id: u64,
    addresses: ChainAddresses,
    receipt_poll: Duration,
}

impl EvmChainClient {
    #[must_use]
    pub fn new(
        rpc_url: url::Url,
        chain_id: u64,
        addresses: ChainAddresses,
        receipt_poll: Duration,
    ) -> Self {
        Self {
            rpc_url,
            chain_id,
            addresses,
            receipt_poll,
        }
    }

    fn signer(key: &PrivateKey) -> Result<PrivateKeySigner, ChainError> {
        PrivateKeySigner::from_str(key.expose())
            .map_err(|e| ChainError::InvalidKey(e.to_string()))
    }

    fn swap_request(&self, from: Address, call: &SwapCall) -> TxRequest {
        TxRequest::default()
            .with_from(from)
            .with_to(self.addresses.router)
            .with_chain_id(self.chain_id)
            .with_input(swap_calldata(call))
    }

    fn to_receipt<R: ReceiptResponse>(receipt: &R) -> TxReceipt {
        TxReceipt {
            tx_hash: receipt.transaction_hash(),
            success: receipt.status(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        }
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    async fn pair_reserves(&self, sell: Address, buy: Address) -> Result<PairReserves, ChainError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());

        let factory = IUniswapV2Factory::new(self.addresses.factory, &provider);
        let pair_address: Address = factory
            .getPair(sell, buy)
            .call()
            .await
            .map_err(|e| from_contract(&e))?;
        if pair_address == Address::ZERO {
            return Err(ChainError::PairNotFound {
                sell: address_key(&sell),
                buy: address_key(&buy),
            });
        }

        let pair = IUniswapV2Pair::new(pair_address, &provider);
        let token0: Address = pair.token0().call().await.map_err(|e| from_contract(&e))?;
        let reserves = pair
            .getReserves()
            .call()
            .await
            .map_err(|e| from_contract(&e))?;
        let reserve0 = U256::from(reserves.reserve0);
        let reserve1 = U256::from(reserves.reserve1);

        if token0 == sell {
            Ok(PairReserves::new(reserve0, reserve1))
        } else {
            Ok(PairReserves::new(reserve1, reserve0))
        }
    }

    async fn allowance(&self, owner: Address, token: Address) -> Result<U256, ChainError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let erc20 = IERC20::new(token, &provider);
        erc20
            .allowance(owner, self.addresses.router)
            .call()
            .await
            .map_err(|e| from_contract(&e))
    }

    async fn approve_max(
        &self,
        key: &PrivateKey,
        token: Address,
    ) -> Result<TxReceipt, ChainError> {
        let signer = Self::signer(key)?;
        let owner = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone());

        let erc20 = IERC20::new(token, &provider);
        let pending = erc20
            .approve(self.addresses.router, U256::MAX)
            .send()
            .await
            .map_err(|e| from_contract(&e))?;
        let handle = TxHandle {
            tx_hash: *pending.tx_hash(),
        };

        info!(
            owner = %address_key(&owner),
            token = %address_key(&token),
            tx_hash = %handle.tx_hash,
            "Approval submitted"
        );
        self.await_receipt(&handle).await
    }

    async fn estimate_gas(&self, key: &PrivateKey, call: &SwapCall) -> Result<u64, ChainError> {
        let from = Self::signer(key)?.address();
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        provider
            .estimate_gas(self.swap_request(from, call))
            .await
            .map_err(|e| from_transport(&e))
    }

    async fn submit(
        &self,
        key: &PrivateKey,
        call: &SwapCall,
        gas_limit: u64,
    ) -> Result<TxHandle, ChainError> {
        let signer = Self::signer(key)?;
        let request = self
            .swap_request(signer.address(), call)
            .with_gas_limit(gas_limit);
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone());

        let pending = provider
            .send_transaction(request)
            .await
            .map_err(|e| from_transport(&e))?;
        Ok(TxHandle {
            tx_hash: *pending.tx_hash(),
        })
    }

    async fn receipt(&self, tx: &TxHandle) -> Result<Option<TxReceipt>, ChainError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let receipt = provider
            .get_transaction_receipt(tx.tx_hash)
            .await
            .map_err(|e| from_transport(&e))?;
        Ok(receipt.as_ref().map(Self::to_receipt))
    }

    async fn await_receipt(&self, tx: &TxHandle) -> Result<TxReceipt, ChainError> {
        poll_until_mined(tx.tx_hash, self.receipt_poll, || self.receipt(tx))
            .await
    }

    fn wrapped_native(&self) -> Address {
        self.addresses.wrapped_native
    }
}

/// Poll `lookup` until it yields a receipt. Transport errors are retried;
/// node errors end the wait.
async fn poll_until_mined<F, Fut>(
    tx_hash: TxHash,
    poll: Duration,
    mut lookup: F,
) -> Result<TxReceipt, ChainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<TxReceipt>, ChainError>>,
{
    loop {
        match lookup().await {
            Ok(Some(receipt)) => return Ok(receipt),
            Ok(None) => debug!(tx_hash = %tx_hash, "Receipt not available yet"),
            Err(ChainError::Transport(error)) => {
                debug!(tx_hash = %tx_hash, error = %error, "Receipt poll failed, retrying");
            }
            Err(e) => return Err(e),
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::outbound::chain::SwapMethod;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn client() -> EvmChainClient {
        EvmChainClient::new(
            "http://localhost:8545".parse().unwrap(),
            31337,
            ChainAddresses {
                router: Address::repeat_byte(0xaa),
                factory: Address::repeat_byte(0xbb),
                wrapped_native: Address::repeat_byte(0xee),
            },
            Duration::from_millis(10),
        )
    }

    #[test]
    fn swap_request_targets_the_router() {
        let client = client();
        let call = SwapCall {
            method: SwapMethod::ExactTokensForTokens,
            amount_in: U256::from(1000u64),
            amount_out_min: U256::from(90u64),
            path: vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)],
            recipient: Address::repeat_byte(0x33),
            deadline: 1,
        };
        let from = Address::repeat_byte(0x33);
        let request = client.swap_request(from, &call);

        assert_eq!(TransactionBuilder::<Ethereum>::from(&request), Some(from));
        assert_eq!(request.chain_id(), Some(31337));
        assert_eq!(
            TransactionBuilder::<Ethereum>::input(&request),
            Some(&swap_calldata(&call))
        );
    }

    #[test]
    fn malformed_key_is_invalid_key() {
        let err = EvmChainClient::signer(&PrivateKey::new("not-hex")).unwrap_err();
        assert!(matches!(err, ChainError::InvalidKey(_)));
        assert!(EvmChainClient::signer(&PrivateKey::new(KEY)).is_ok());
    }

    #[test]
    fn wrapped_native_comes_from_config() {
        assert_eq!(client().wrapped_native(), Address::repeat_byte(0xee));
    }

    fn mined(tx_hash: TxHash) -> TxReceipt {
        TxReceipt {
            tx_hash,
            success: true,
            block_number: Some(7),
            gas_used: 21_000,
        }
    }

    #[tokio::test]
    async fn receipt_wait_retries_transport_errors() {
        let tx_hash = TxHash::repeat_byte(0x42);
        let mut script = vec![
            Ok(Some(mined(tx_hash))),
            Ok(None),
            Err(ChainError::Transport("connection reset".into())),
        ];
        let mut lookups = 0;

        let receipt = poll_until_mined(tx_hash, Duration::from_millis(1), || {
            lookups += 1;
            let next = script.pop().unwrap();
            async move { next }
        })
        .await
        .unwrap();

        assert_eq!(receipt, mined(tx_hash));
        assert_eq!(lookups, 3);
    }

    #[tokio::test]
    async fn receipt_wait_stops_on_node_errors() {
        let err = poll_until_mined(TxHash::ZERO, Duration::from_millis(1), || async {
            Err::<Option<TxReceipt>, _>(ChainError::Rpc {
                code: -32602,
                message: "invalid argument".into(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ChainError::Rpc { code: -32602, .. }));
    }
}
