//! Decimal price helpers.
//!
//! Prices are carried as [`Decimal`] amounts in the store currency's
//! standard unit (e.g. dollars, not cents). The backend owns currency
//! selection, so amounts here are currency-agnostic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Percentage saved when paying `price` instead of `compare_at`.
///
/// Rounds half away from zero to a whole percent. Returns `0` when
/// `compare_at` is not positive or is not above `price`.
#[must_use]
pub fn discount_percent(compare_at: Decimal, price: Decimal) -> u32 {
    if compare_at <= Decimal::ZERO || compare_at <= price {
        return 0;
    }

    ((compare_at - price) / compare_at * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Format an amount for display with two decimal places (e.g. `"19.90"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent_basic() {
        assert_eq!(discount_percent(Decimal::from(200), Decimal::from(100)), 50);
        assert_eq!(discount_percent(Decimal::from(150), Decimal::from(100)), 33);
    }

    #[test]
    fn test_discount_percent_rounds_half_up() {
        // 1/8 = 12.5% -> 13
        assert_eq!(discount_percent(Decimal::from(8), Decimal::from(7)), 13);
    }

    #[test]
    fn test_discount_percent_no_discount() {
        assert_eq!(discount_percent(Decimal::from(100), Decimal::from(100)), 0);
        assert_eq!(discount_percent(Decimal::from(80), Decimal::from(100)), 0);
        assert_eq!(discount_percent(Decimal::ZERO, Decimal::ZERO), 0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(1999, 2)), "19.99");
        assert_eq!(format_amount(Decimal::from(5)), "5.00");
        assert_eq!(format_amount(Decimal::new(10005, 3)), "10.01");
    }
}
