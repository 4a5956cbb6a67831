//! Deterministic [`KeyResolver`] for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::wallet::{PrivateKey, Wallet};
use crate::error::{KeyError, Result};
use crate::port::outbound::keys::KeyResolver;

/// Resolves every wallet to a fixed key unless told to fail for it.
#[derive(Default)]
pub struct StaticKeyResolver {
    failing: Mutex<HashSet<String>>,
    resolutions: AtomicUsize,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make resolution fail for the wallet with `wallet_id`.
    pub fn fail_for(&self, wallet_id: &str) {
        self.failing.lock().insert(wallet_id.to_string());
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, wallet: &Wallet) -> Result<PrivateKey> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(wallet.id.as_str()) {
            return Err(KeyError::NotFound(wallet.key_material.clone()).into());
        }
        Ok(PrivateKey::new(
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        ))
    }
}
