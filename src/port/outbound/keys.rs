//! Key resolution port.

use async_trait::async_trait;

use crate::domain::wallet::{PrivateKey, Wallet};
use crate::error::Result;

/// Turns a wallet's opaque key material into a signing key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve the private key for `wallet`.
    ///
    /// # Errors
    ///
    /// Returns an error when the material is missing or cannot be decrypted.
    async fn resolve(&self, wallet: &Wallet) -> Result<PrivateKey>;
}
