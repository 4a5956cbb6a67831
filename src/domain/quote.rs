//! Constant-product pricing.
//!
//! Exact-input output for a Uniswap-V2 style pair with a 0.3% fee, and the
//! minimum-output bound derived from a slippage tolerance.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::DomainError;

/// Fee numerator out of [`FEE_DENOMINATOR`] retained by the pool (0.3% fee).
const FEE_NUMERATOR: u64 = 997;
const FEE_DENOMINATOR: u64 = 1000;

/// Basis points in one whole.
const BPS_SCALE: u64 = 10_000;

/// Reserves of a pair, oriented so that `reserve_in` is the sell side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

impl PairReserves {
    pub fn new(reserve_in: U256, reserve_out: U256) -> Self {
        Self {
            reserve_in,
            reserve_out,
        }
    }

    /// Output amount for an exact input, after the pool fee.
    ///
    /// # Errors
    ///
    /// [`DomainError::InsufficientInputAmount`] for a zero input,
    /// [`DomainError::InsufficientLiquidity`] when either reserve is empty or
    /// the output rounds down to zero.
    pub fn amount_out(&self, amount_in: U256) -> Result<U256, DomainError> {
        if amount_in.is_zero() {
            return Err(DomainError::InsufficientInputAmount);
        }
        if self.reserve_in.is_zero() || self.reserve_out.is_zero() {
            return Err(DomainError::InsufficientLiquidity);
        }

        let amount_in_with_fee = amount_in
            .checked_mul(U256::from(FEE_NUMERATOR))
            .ok_or(DomainError::Overflow("amount in with fee"))?;
        let numerator = amount_in_with_fee
            .checked_mul(self.reserve_out)
            .ok_or(DomainError::Overflow("swap numerator"))?;
        let denominator = self
            .reserve_in
            .checked_mul(U256::from(FEE_DENOMINATOR))
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(DomainError::Overflow("swap denominator"))?;

        let out = numerator / denominator;
        if out.is_zero() {
            return Err(DomainError::InsufficientLiquidity);
        }
        Ok(out)
    }
}

/// Slippage percent expressed as whole basis points (truncated).
///
/// # Errors
///
/// Returns [`DomainError::NegativeSlippage`] for negative input.
pub fn slippage_bps(slippage_percent: Decimal) -> Result<u64, DomainError> {
    if slippage_percent.is_sign_negative() && !slippage_percent.is_zero() {
        return Err(DomainError::NegativeSlippage {
            value: slippage_percent,
        });
    }
    (slippage_percent * dec!(100))
        .trunc()
        .to_u64()
        .ok_or(DomainError::Overflow("slippage basis points"))
}

/// Lower bound on the received amount: `quoted * 10000 / (10000 + bps)`.
///
/// # Errors
///
/// Propagates slippage validation and overflow errors.
pub fn minimum_output(quoted: U256, slippage_percent: Decimal) -> Result<U256, DomainError> {
    let bps = slippage_bps(slippage_percent)?;
    let scaled = quoted
        .checked_mul(U256::from(BPS_SCALE))
        .ok_or(DomainError::Overflow("minimum output"))?;
    Ok(scaled / U256::from(BPS_SCALE + bps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn amount_out_applies_fee() {
        // 1000 in against 1_000_000/1_000_000: 997000 * 1e6 / (1e9 + 997000)
        let reserves = PairReserves::new(u(1_000_000), u(1_000_000));
        assert_eq!(reserves.amount_out(u(1000)).unwrap(), u(996));
    }

    #[test]
    fn amount_out_matches_reserve_construction() {
        // With R_in = 997k and amount_in = 1000k the output is R_out / 2.
        let reserves = PairReserves::new(u(997 * 3), u(2 * 99));
        assert_eq!(reserves.amount_out(u(1000 * 3)).unwrap(), u(99));
    }

    #[test]
    fn zero_reserves_are_insufficient_liquidity() {
        let reserves = PairReserves::new(U256::ZERO, u(5));
        assert_eq!(
            reserves.amount_out(u(10)),
            Err(DomainError::InsufficientLiquidity)
        );
        let reserves = PairReserves::new(u(5), U256::ZERO);
        assert_eq!(
            reserves.amount_out(u(10)),
            Err(DomainError::InsufficientLiquidity)
        );
    }

    #[test]
    fn dust_output_is_insufficient_liquidity() {
        let reserves = PairReserves::new(u(1_000_000_000), u(1));
        assert_eq!(
            reserves.amount_out(u(10)),
            Err(DomainError::InsufficientLiquidity)
        );
    }

    #[test]
    fn zero_input_is_rejected() {
        let reserves = PairReserves::new(u(10), u(10));
        assert_eq!(
            reserves.amount_out(U256::ZERO),
            Err(DomainError::InsufficientInputAmount)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let reserves = PairReserves::new(U256::MAX, U256::MAX);
        assert!(matches!(
            reserves.amount_out(U256::MAX),
            Err(DomainError::Overflow(_))
        ));
    }

    #[test]
    fn minimum_output_uses_basis_points() {
        // 0.5% -> 50 bps -> 10000 * 10000 / 10050
        assert_eq!(minimum_output(u(10_000), dec!(0.5)).unwrap(), u(9950));
        // default 0.05% -> 5 bps
        assert_eq!(minimum_output(u(10_005), dec!(0.05)).unwrap(), u(10_000));
        assert_eq!(minimum_output(u(1234), Decimal::ZERO).unwrap(), u(1234));
    }

    #[test]
    fn fractional_basis_points_truncate() {
        assert_eq!(slippage_bps(dec!(0.005)).unwrap(), 0);
        assert_eq!(slippage_bps(dec!(1.259)).unwrap(), 125);
    }

    #[test]
    fn negative_slippage_is_rejected() {
        assert!(matches!(
            minimum_output(u(100), dec!(-1)),
            Err(DomainError::NegativeSlippage { .. })
        ));
    }
}
