//! Common utility functions for fee calculations.
//!
//! Rounding used for display, and the clamps every edit path of the fee
//! split engine funnels through.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Lowest artist share accepted (commission capped at 50%).
pub const MIN_SPLIT_RATIO: Decimal = dec!(0.50);

/// Highest artist share accepted (commission floored at 5%).
pub const MAX_SPLIT_RATIO: Decimal = dec!(0.95);

/// Upper bound of a VAT percentage.
pub const MAX_VAT_RATE: Decimal = dec!(100);

/// Largest total rate the engine works with. Keeps every derived product
/// well inside `Decimal`'s range.
pub const MAX_TOTAL_RATE: Decimal = dec!(1000000000000);

/// Rounds a monetary value to two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use showpro_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(127.454)), dec!(127.45));
/// assert_eq!(round_currency(dec!(127.455)), dec!(127.46));
/// assert_eq!(round_currency(dec!(-127.455)), dec!(-127.46)); // Away from zero
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to one decimal place using half-up rounding.
///
/// ```
/// use rust_decimal_macros::dec;
/// use showpro_core::calculations::common::round_percent;
///
/// assert_eq!(round_percent(dec!(7.45)), dec!(7.5));
/// assert_eq!(round_percent(dec!(84.94)), dec!(84.9));
/// ```
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Saturates `value` into `[lo, hi]`.
pub fn clamp(
    value: Decimal,
    lo: Decimal,
    hi: Decimal,
) -> Decimal {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Clamps an artist share into `[MIN_SPLIT_RATIO, MAX_SPLIT_RATIO]`.
///
/// Every split entry point goes through this, including back-solved ratios
/// and ratios restored from stored preferences.
///
/// ```
/// use rust_decimal_macros::dec;
/// use showpro_core::calculations::common::clamp_split_ratio;
///
/// assert_eq!(clamp_split_ratio(dec!(0.99)), dec!(0.95));
/// assert_eq!(clamp_split_ratio(dec!(0.2)), dec!(0.50));
/// assert_eq!(clamp_split_ratio(dec!(0.8)), dec!(0.8));
/// ```
pub fn clamp_split_ratio(ratio: Decimal) -> Decimal {
    clamp(ratio, MIN_SPLIT_RATIO, MAX_SPLIT_RATIO)
}

/// Clamps a VAT percentage into `[0, 100]`.
pub fn clamp_vat_rate(rate: Decimal) -> Decimal {
    clamp(rate, Decimal::ZERO, MAX_VAT_RATE)
}

/// Clamps a total rate into `[0, MAX_TOTAL_RATE]`.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use showpro_core::calculations::common::{MAX_TOTAL_RATE, clamp_total_rate};
///
/// assert_eq!(clamp_total_rate(dec!(-1)), Decimal::ZERO);
/// assert_eq!(clamp_total_rate(Decimal::MAX), MAX_TOTAL_RATE);
/// ```
pub fn clamp_total_rate(total: Decimal) -> Decimal {
    clamp(total, Decimal::ZERO, MAX_TOTAL_RATE)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // round_currency tests
    // =========================================================================

    #[test]
    fn round_currency_rounds_down_below_midpoint() {
        assert_eq!(round_currency(dec!(22.504)), dec!(22.50));
    }

    #[test]
    fn round_currency_rounds_up_at_midpoint() {
        assert_eq!(round_currency(dec!(22.505)), dec!(22.51));
    }

    #[test]
    fn round_currency_keeps_already_rounded_values() {
        assert_eq!(round_currency(dec!(153.00)), dec!(153.00));
    }

    #[test]
    fn round_currency_handles_long_fractions() {
        // 100 / 3 with full decimal precision
        let third = dec!(100) / dec!(3);

        assert_eq!(round_currency(third), dec!(33.33));
    }

    // =========================================================================
    // round_percent tests
    // =========================================================================

    #[test]
    fn round_percent_rounds_to_one_place() {
        assert_eq!(round_percent(dec!(92.55)), dec!(92.6));
        assert_eq!(round_percent(dec!(92.54)), dec!(92.5));
    }

    // =========================================================================
    // clamp tests
    // =========================================================================

    #[test]
    fn clamp_split_ratio_saturates_high() {
        assert_eq!(clamp_split_ratio(dec!(1.2)), MAX_SPLIT_RATIO);
    }

    #[test]
    fn clamp_split_ratio_saturates_low() {
        assert_eq!(clamp_split_ratio(dec!(-3)), MIN_SPLIT_RATIO);
    }

    #[test]
    fn clamp_split_ratio_keeps_boundaries() {
        assert_eq!(clamp_split_ratio(dec!(0.95)), dec!(0.95));
        assert_eq!(clamp_split_ratio(dec!(0.50)), dec!(0.50));
    }

    #[test]
    fn clamp_vat_rate_bounds_to_percentage_range() {
        assert_eq!(clamp_vat_rate(dec!(-5)), Decimal::ZERO);
        assert_eq!(clamp_vat_rate(dec!(120)), dec!(100));
        assert_eq!(clamp_vat_rate(dec!(17.5)), dec!(17.5));
    }

    #[test]
    fn clamp_total_rate_caps_huge_totals() {
        assert_eq!(clamp_total_rate(Decimal::MAX), MAX_TOTAL_RATE);
        assert_eq!(clamp_total_rate(dec!(150)), dec!(150));
    }

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(-50.00), dec!(0)), dec!(0));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }
}
