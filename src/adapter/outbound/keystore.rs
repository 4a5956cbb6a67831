//! Keystore-backed key resolution.
//!
//! A wallet's key material names an encrypted JSON keystore (Web3 secret
//! storage) inside the configured directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::wallet::{PrivateKey, Wallet};
use crate::error::{Error, KeyError, Result};
use crate::port::outbound::keys::KeyResolver;

/// Decrypts wallet keystores with the process passphrase.
pub struct KeystoreResolver {
    dir: PathBuf,
    password: String,
}

impl KeystoreResolver {
    pub fn new(dir: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            password: password.into(),
        }
    }

    /// Path of the keystore named by `material`.
    ///
    /// # Errors
    ///
    /// [`KeyError::OutsideKeystore`] for absolute paths and any `..`
    /// component.
    pub fn keystore_path(&self, material: &str) -> std::result::Result<PathBuf, KeyError> {
        let relative = Path::new(material.trim());
        let plain = !material.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(KeyError::OutsideKeystore(material.to_string()));
        }
        Ok(self.dir.join(relative))
    }
}

#[cfg(feature = "evm")]
fn decrypt_keystore(path: &Path, password: &str) -> std::result::Result<PrivateKey, KeyError> {
    use alloy_signer_local::PrivateKeySigner;

    let signer =
        PrivateKeySigner::decrypt_keystore(path, password).map_err(|e| KeyError::Decrypt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(PrivateKey::new(format!("{:x}", signer.to_bytes())))
}

#[cfg(not(feature = "evm"))]
fn decrypt_keystore(_path: &Path, _password: &str) -> std::result::Result<PrivateKey, KeyError> {
    Err(KeyError::Unsupported)
}

#[async_trait]
impl KeyResolver for KeystoreResolver {
    async fn resolve(&self, wallet: &Wallet) -> Result<PrivateKey> {
        let path = self.keystore_path(&wallet.key_material)?;
        if !path.is_file() {
            return Err(KeyError::NotFound(path.display().to_string()).into());
        }

        debug!(wallet_id = %wallet.id, "Decrypting keystore");
        let password = self.password.clone();
        let key = tokio::task::spawn_blocking(move || decrypt_keystore(&path, &password))
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        Ok(key)
    }
}
