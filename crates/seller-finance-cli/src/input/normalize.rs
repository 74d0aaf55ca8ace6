//! Free-text numeric input, normalized before it reaches the engine.
//!
//! Amounts typed as "6,000,000" or "$356,000" parse to plain decimals;
//! anything unparseable becomes zero. Rates are clamped to [0, 100] and
//! year counts are floored at 1.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Keep digits, `.` and `-`; empty or unparseable text is zero.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.as_str() {
        "" | "-" | "." => Decimal::ZERO,
        s => Decimal::from_str(s).unwrap_or(Decimal::ZERO),
    }
}

/// Parse an amount and clamp it to `min` (zero for prices and balances).
pub fn amount_at_least(text: &str, min: Decimal) -> Decimal {
    parse_amount(text).max(min)
}

/// Annual rate in percent, `%` allowed, clamped to [0, 100].
pub fn rate_pct(text: &str) -> Decimal {
    parse_amount(text).max(Decimal::ZERO).min(dec!(100))
}

/// Whole years, at least 1.
pub fn years(text: &str) -> u32 {
    parse_amount(text).trunc().to_u32().unwrap_or(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_strips_formatting() {
        assert_eq!(parse_amount("6,000,000"), dec!(6000000));
        assert_eq!(parse_amount("$356,000.50"), dec!(356000.50));
        assert_eq!(parse_amount("-12,500"), dec!(-12500));
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        for text in ["", "-", ".", "abc", "1.2.3", "1-2"] {
            assert_eq!(parse_amount(text), Decimal::ZERO, "{text:?}");
        }
    }

    #[test]
    fn test_amount_at_least_clamps() {
        assert_eq!(amount_at_least("-200", Decimal::ZERO), Decimal::ZERO);
        assert_eq!(amount_at_least("200", Decimal::ZERO), dec!(200));
    }

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(rate_pct("6.3%"), dec!(6.3));
        assert_eq!(rate_pct("-4"), Decimal::ZERO);
        assert_eq!(rate_pct("250"), dec!(100));
        assert_eq!(rate_pct("n/a"), Decimal::ZERO);
    }

    #[test]
    fn test_years_floor_at_one() {
        assert_eq!(years("25"), 25);
        assert_eq!(years("0"), 1);
        assert_eq!(years("-3"), 1);
        assert_eq!(years("abc"), 1);
        assert_eq!(years("7.9"), 7);
    }
}
