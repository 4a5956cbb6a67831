//! Keystore location and passphrase.

use std::fs;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Environment variable holding the keystore passphrase.
pub const KEYSTORE_PASSWORD_ENV: &str = "TRIGGER_SWAP_KEYSTORE_PASSWORD";

/// Environment variable naming a file that holds the keystore passphrase.
pub const KEYSTORE_PASSWORD_FILE_ENV: &str = "TRIGGER_SWAP_KEYSTORE_PASSWORD_FILE";

/// Wallet keystores. The passphrase is never read from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct KeysConfig {
    /// Directory holding one encrypted JSON keystore per wallet.
    #[serde(default = "default_keystore_dir")]
    pub keystore_dir: String,
}

fn default_keystore_dir() -> String {
    "keystores".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            keystore_dir: default_keystore_dir(),
        }
    }
}

/// Read the keystore passphrase from the environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when neither variable is set or the
/// password file is empty, and [`ConfigError::ReadFile`] when the file cannot
/// be read.
pub fn read_keystore_password() -> Result<String> {
    if let Ok(password) = std::env::var(KEYSTORE_PASSWORD_ENV) {
        return Ok(password);
    }
    if let Ok(path) = std::env::var(KEYSTORE_PASSWORD_FILE_ENV) {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let password = contents.trim().to_string();
        if password.is_empty() {
            return Err(ConfigError::MissingField {
                field: KEYSTORE_PASSWORD_FILE_ENV,
            }
            .into());
        }
        return Ok(password);
    }

    Err(ConfigError::MissingField {
        field: KEYSTORE_PASSWORD_ENV,
    }
    .into())
}
