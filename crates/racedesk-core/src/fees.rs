//! # Fee Engine
//!
//! Converts decimal percentages into integer basis points and applies them
//! to cent amounts with integer-only arithmetic.
//!
//! ## Why Basis Points?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  10.5% of $1,000.00                                                     │
//! │                                                                         │
//! │  Naive float:   100000 * 0.105 = 10500.000000000002   ❌ drift          │
//! │                                                                         │
//! │  Basis points:  10.5% → 1050 bps (exact decimal × 100, rounded)         │
//! │                 100000 × 1050 / 10000 = 10500          ✅ exact          │
//! │                                                                         │
//! │  The division truncates toward zero, so a fee never rounds up into      │
//! │  money that was not earned.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages cross every API boundary as plain decimals (10.5 means
//! 10.5%); basis points are strictly internal to this module.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Conversion
// =============================================================================

/// Converts a decimal percentage to integer basis points.
///
/// `round(pct * 100)`, half away from zero, computed on the exact decimal
/// representation. Typical two/three-decimal rates (10.5, 1.2, 0.125) never
/// pick up an off-by-one basis point the way binary floats can.
///
/// ## Example
/// ```rust
/// use racedesk_core::fees::percent_to_basis_points;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percent_to_basis_points(Decimal::new(105, 1)), 1050); // 10.5%
/// assert_eq!(percent_to_basis_points(Decimal::new(12, 1)), 120);   // 1.2%
/// ```
pub fn percent_to_basis_points(pct: Decimal) -> i64 {
    (pct * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Applies a percentage to a base amount.
///
/// `None` means "no fee configured" and yields zero. Otherwise the result
/// is `base * bps / 10000` computed in i128 so large revenues cannot
/// overflow mid-multiplication; the division truncates toward zero.
pub fn apply_percent(base: Money, pct: Option<Decimal>) -> Money {
    let Some(pct) = pct else {
        return Money::zero();
    };

    let bps = percent_to_basis_points(pct);
    let cents = (base.cents() as i128 * bps as i128) / 10_000;
    Money::from_cents(cents as i64)
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// Default payment processor fee: 2%.
pub const DEFAULT_PROCESSOR_PCT: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
/// Default gross receipts tax: 4%.
pub const DEFAULT_GROSS_RECEIPTS_PCT: Decimal = Decimal::from_parts(4, 0, 0, false, 0);
/// Default VAT: 10.5%.
pub const DEFAULT_VAT_PCT: Decimal = Decimal::from_parts(105, 0, 0, false, 1);
/// Default photo provider commission: 17%.
pub const DEFAULT_PROVIDER_PCT: Decimal = Decimal::from_parts(17, 0, 0, false, 0);
/// Default debit/credit card tax: 1.2%.
pub const DEFAULT_DEBIT_CREDIT_PCT: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// The five percentage fees an event carries against its ARS revenue.
///
/// `None` means the fee is not configured for the event and contributes
/// zero. These fees apply to ARS revenue only; USD revenue is never
/// fee-bearing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Payment processor fee.
    pub processor_pct: Option<Decimal>,
    /// Gross receipts tax ("ingresos brutos").
    pub gross_receipts_pct: Option<Decimal>,
    /// Value-added tax.
    pub vat_pct: Option<Decimal>,
    /// Photo provider commission.
    pub provider_pct: Option<Decimal>,
    /// Debit/credit card tax.
    pub debit_credit_pct: Option<Decimal>,
}

impl FeeSchedule {
    /// The business defaults substituted for omitted percentages when an
    /// event is created: processor 2%, gross receipts 4%, VAT 10.5%,
    /// provider 17%, debit/credit 1.2%.
    pub const fn business_defaults() -> Self {
        FeeSchedule {
            processor_pct: Some(DEFAULT_PROCESSOR_PCT),
            gross_receipts_pct: Some(DEFAULT_GROSS_RECEIPTS_PCT),
            vat_pct: Some(DEFAULT_VAT_PCT),
            provider_pct: Some(DEFAULT_PROVIDER_PCT),
            debit_credit_pct: Some(DEFAULT_DEBIT_CREDIT_PCT),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_basis_points() {
        assert_eq!(percent_to_basis_points(Decimal::from(2)), 200);
        assert_eq!(percent_to_basis_points(Decimal::new(105, 1)), 1050);
        assert_eq!(percent_to_basis_points(Decimal::new(12, 1)), 120);
        assert_eq!(percent_to_basis_points(Decimal::ZERO), 0);
    }

    #[test]
    fn test_basis_points_round_half_away_from_zero() {
        // 0.005% * 100 = 0.5 bps → 1
        assert_eq!(percent_to_basis_points(Decimal::new(5, 3)), 1);
        assert_eq!(percent_to_basis_points(Decimal::new(-5, 3)), -1);
        // 0.004% * 100 = 0.4 bps → 0
        assert_eq!(percent_to_basis_points(Decimal::new(4, 3)), 0);
    }

    #[test]
    fn test_apply_percent_exact() {
        // 10.5% of 100000 cents is exactly 10500 cents
        let fee = apply_percent(Money::from_cents(100_000), Some(Decimal::new(105, 1)));
        assert_eq!(fee.cents(), 10_500);

        // 2% of 30000
        let fee = apply_percent(Money::from_cents(30_000), Some(Decimal::from(2)));
        assert_eq!(fee.cents(), 600);
    }

    #[test]
    fn test_apply_percent_none_is_zero() {
        for base in [0i64, 1, 100_000, i64::MAX / 2] {
            assert_eq!(apply_percent(Money::from_cents(base), None).cents(), 0);
        }
    }

    #[test]
    fn test_apply_percent_truncates_toward_zero() {
        // 1.2% of 999 cents = 11.988 → 11
        let fee = apply_percent(Money::from_cents(999), Some(Decimal::new(12, 1)));
        assert_eq!(fee.cents(), 11);

        // same magnitude on a negative base truncates toward zero, not down
        let fee = apply_percent(Money::from_cents(-999), Some(Decimal::new(12, 1)));
        assert_eq!(fee.cents(), -11);
    }

    #[test]
    fn test_apply_percent_large_base_no_overflow() {
        // Half of i64::MAX cents at 100% survives the i128 intermediate
        let base = Money::from_cents(i64::MAX / 2);
        let fee = apply_percent(base, Some(Decimal::from(100)));
        assert_eq!(fee.cents(), i64::MAX / 2);
    }

    #[test]
    fn test_business_defaults() {
        let defaults = FeeSchedule::business_defaults();
        assert_eq!(defaults.processor_pct, Some(Decimal::from(2)));
        assert_eq!(defaults.vat_pct, Some(Decimal::new(105, 1)));
        assert_eq!(defaults.debit_credit_pct, Some(Decimal::new(12, 1)));
    }
}
