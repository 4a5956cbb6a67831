//! Failure classification for per-order errors.
//!
//! Every error raised while evaluating an order maps to one of a closed set
//! of outcomes. None of them changes the order: the order stays `active` and
//! is evaluated again on the next tick.

use std::fmt;

use crate::error::{ChainError, Error, ExecutionError};

/// Marker the router reverts with when the sender cannot pay the transfer.
const TRANSFER_FAILED: &str = "TRANSFER_FAILED";

/// Router revert reasons that mean the pool cannot fill the swap.
const LIQUIDITY_REVERTS: [&str; 2] = ["INSUFFICIENT_LIQUIDITY", "INSUFFICIENT_INPUT_AMOUNT"];

/// Closed set of failure outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureOutcome {
    /// The approval transaction could not be paid for.
    InsufficientApprovalGas,
    /// The pool cannot fill the trade at this size.
    InsufficientLiquidity,
    /// The wallet cannot pay gas for the swap.
    InsufficientGasFunds,
    /// Anything else; logged with the full error.
    Unclassified,
}

impl FailureOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientApprovalGas => "insufficient_approval_gas",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::InsufficientGasFunds => "insufficient_gas_funds",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an evaluation error.
#[must_use]
pub fn classify(error: &Error) -> FailureOutcome {
    match error {
        Error::Execution(ExecutionError::ApprovalGasInsufficient(_)) => {
            FailureOutcome::InsufficientApprovalGas
        }
        Error::Domain(domain) if domain.is_liquidity() => FailureOutcome::InsufficientLiquidity,
        Error::Chain(ChainError::PairNotFound { .. }) => FailureOutcome::InsufficientLiquidity,
        Error::Chain(chain) if is_liquidity_revert(chain) => FailureOutcome::InsufficientLiquidity,
        Error::Execution(ExecutionError::GasEstimation(chain)) => {
            if chain.is_gas_shortfall() || chain.message().contains(TRANSFER_FAILED) {
                FailureOutcome::InsufficientGasFunds
            } else if is_liquidity_revert(chain) {
                FailureOutcome::InsufficientLiquidity
            } else {
                FailureOutcome::Unclassified
            }
        }
        Error::Execution(ExecutionError::Submission(chain)) if chain.is_gas_shortfall() => {
            FailureOutcome::InsufficientGasFunds
        }
        _ => FailureOutcome::Unclassified,
    }
}

fn is_liquidity_revert(chain: &ChainError) -> bool {
    let message = chain.message();
    LIQUIDITY_REVERTS
        .iter()
        .any(|marker| message.contains(marker))
}
