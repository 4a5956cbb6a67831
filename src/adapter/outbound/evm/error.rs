//! Mapping of alloy client errors onto [`ChainError`].

use alloy_transport::TransportError;

use crate::error::ChainError;

/// Keep the node's JSON-RPC code and message when there is one.
pub fn from_transport(err: &TransportError) -> ChainError {
    match err.as_error_resp() {
        Some(payload) => ChainError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => ChainError::Transport(err.to_string()),
    }
}

pub fn from_contract(err: &alloy_contract::Error) -> ChainError {
    match err {
        alloy_contract::Error::TransportError(e) => from_transport(e),
        other => ChainError::Contract(other.to_string()),
    }
}
