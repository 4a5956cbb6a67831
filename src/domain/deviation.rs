//! Deviation of a live quote from an order's target.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::error::DomainError;

/// Fractional digits kept in a deviation percentage.
pub const DEVIATION_SCALE: u32 = 6;

/// `100 * 10^DEVIATION_SCALE`.
const PERCENT_FACTOR: u64 = 100_000_000;

/// `((quoted - target) / target) * 100`, truncated to six fractional digits.
///
/// The division happens on 256-bit integers so large token amounts keep full
/// precision. Results beyond the decimal range saturate at
/// `Decimal::MAX` / `Decimal::MIN`.
///
/// # Errors
///
/// Returns [`DomainError::ZeroTarget`] when `target` is zero.
pub fn percentage_change(quoted: U256, target: U256) -> Result<Decimal, DomainError> {
    if target.is_zero() {
        return Err(DomainError::ZeroTarget);
    }

    let negative = quoted < target;
    let diff = if negative {
        target - quoted
    } else {
        quoted - target
    };

    let Some(scaled) = diff.checked_mul(U256::from(PERCENT_FACTOR)) else {
        return Ok(saturate(negative));
    };
    let magnitude = scaled / target;

    let Ok(magnitude) = i128::try_from(magnitude) else {
        return Ok(saturate(negative));
    };
    let signed = if negative { -magnitude } else { magnitude };

    Ok(Decimal::try_from_i128_with_scale(signed, DEVIATION_SCALE).unwrap_or(saturate(negative)))
}

fn saturate(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}
