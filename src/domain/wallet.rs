//! Trading wallets and resolved signing keys.

use std::fmt;

use alloy_primitives::Address;

use super::id::WalletId;

/// A user's trading wallet.
///
/// `key_material` is opaque: only a [`KeyResolver`](crate::port::outbound::keys::KeyResolver)
/// knows how to turn it into a usable [`PrivateKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub id: WalletId,
    pub address: Address,
    pub key_material: String,
}

impl Wallet {
    /// Create a wallet record.
    pub fn new(id: impl Into<WalletId>, address: Address, key_material: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address,
            key_material: key_material.into(),
        }
    }
}

/// Hex-encoded private key, held only for the duration of an evaluation.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Wrap a hex private key (with or without `0x`).
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Borrow the raw hex key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
