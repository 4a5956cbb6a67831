//! Trigger rules per order kind.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::order::OrderKind;

/// Width of the open interval (in percent) inside which orders fire.
pub const DEFAULT_TRIGGER_BAND: Decimal = dec!(5);

/// What to do with an order after pricing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Execute,
    Hold,
}

/// Maps (kind, deviation) to a decision.
///
/// | kind        | fires when          |
/// |-------------|---------------------|
/// | market      | `-band < x < band`  |
/// | stop-loss   | `-band < x < 0`     |
/// | take-profit | `0 < x < band`      |
///
/// All bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPolicy {
    band: Decimal,
}

impl TriggerPolicy {
    pub fn new(band: Decimal) -> Self {
        Self { band }
    }

    #[must_use]
    pub fn band(&self) -> Decimal {
        self.band
    }

    /// Decide whether an order of `kind` at deviation `change` fires.
    #[must_use]
    pub fn decide(&self, kind: OrderKind, change: Decimal) -> Decision {
        let lower = -self.band;
        let fires = match kind {
            OrderKind::Market => lower < change && change < self.band,
            OrderKind::StopLoss => lower < change && change < Decimal::ZERO,
            OrderKind::TakeProfit => Decimal::ZERO < change && change < self.band,
        };
        if fires {
            Decision::Execute
        } else {
            Decision::Hold
        }
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_BAND)
    }
}
