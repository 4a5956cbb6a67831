use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures reported by the chain client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The node answered with a JSON-RPC error payload.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no pair for {sell} / {buy}")]
    PairNotFound { sell: String, buy: String },

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("no receipt for {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("contract call failed: {0}")]
    Contract(String),
}

impl ChainError {
    /// Text the node (or client library) attached to the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Rpc { message, .. } => message,
            Self::Transport(message) | Self::Contract(message) | Self::InvalidKey(message) => {
                message
            }
            Self::PairNotFound { .. } | Self::Reverted { .. } | Self::ReceiptTimeout { .. } => "",
        }
    }

    /// Provider reported a gas shortfall for the sender.
    #[must_use]
    pub fn is_gas_shortfall(&self) -> bool {
        let message = self.message().to_ascii_lowercase();
        message.starts_with("gas required exceeds allowance")
            || message.contains("insufficient funds")
    }
}

/// Order persistence errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("order not found: {0}")]
    NotFound(String),

    /// The stored version moved on since the order was loaded.
    #[error("version conflict on order {order_id}: expected {expected}")]
    VersionConflict { order_id: String, expected: i64 },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt row for order {order_id}: {reason}")]
    Corrupt { order_id: String, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures while driving a triggered order on chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("approval gas insufficient: {0}")]
    ApprovalGasInsufficient(#[source] ChainError),

    #[error("approval failed: {0}")]
    ApprovalFailed(#[source] ChainError),

    #[error("gas estimation failed: {0}")]
    GasEstimation(#[source] ChainError),

    #[error("failed to submit swap: {0}")]
    Submission(#[source] ChainError),

    #[error("swap not confirmed: {0}")]
    Confirmation(#[source] ChainError),
}

/// Key resolution errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("keystore reference escapes the keystore directory: {0}")]
    OutsideKeystore(String),

    #[error("keystore not found: {0}")]
    NotFound(String),

    #[error("failed to decrypt keystore {path}: {reason}")]
    Decrypt { path: String, reason: String },

    #[error("keystore support requires the evm feature")]
    Unsupported,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("real-time channel error: {0}")]
    Channel(String),

    #[error("task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        Self::Store(StoreError::Database(e.to_string()))
    }
}

impl Error {
    /// True when a save lost an optimistic-concurrency race.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::VersionConflict { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
