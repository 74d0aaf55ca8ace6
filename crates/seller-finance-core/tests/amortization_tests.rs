use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use seller_finance_core::amortization::{monthly_payment, remaining_balance};
use seller_finance_core::schedule::generate_first_year_schedule;

const TOLERANCE: Decimal = dec!(0.000001);

fn grid() -> Vec<(Decimal, Decimal, u32)> {
    let mut cases = Vec::new();
    for balance in [dec!(0), dec!(1), dec!(250000), dec!(6000000)] {
        for rate in [dec!(0), dec!(0.5), dec!(6.3), dec!(18), dec!(100)] {
            for years in [1u32, 5, 25, 40] {
                cases.push((balance, rate, years));
            }
        }
    }
    cases
}

// ===========================================================================
// Payment and balance properties
// ===========================================================================

#[test]
fn test_payment_never_negative() {
    for (balance, rate, years) in grid() {
        let payment = monthly_payment(balance, rate, years);
        assert!(payment >= Decimal::ZERO, "{balance} {rate}% {years}y -> {payment}");
    }
}

#[test]
fn test_loan_fully_amortizes_at_term() {
    for (balance, rate, years) in grid() {
        let remaining = remaining_balance(balance, rate, years, years * 12);
        assert!(
            remaining < TOLERANCE,
            "{balance} at {rate}% over {years}y left {remaining}"
        );
    }
}

#[test]
fn test_balance_at_month_zero_is_original() {
    for (balance, rate, years) in grid() {
        assert_eq!(remaining_balance(balance, rate, years, 0), balance);
    }
}

#[test]
fn test_zero_rate_reference_payment() {
    assert_eq!(monthly_payment(dec!(120000), dec!(0), 10), dec!(1000));
}

#[test]
fn test_thirty_year_mortgage_reference() {
    // $300k at 6% over 30 years: $1,798.65/mo
    let payment = monthly_payment(dec!(300000), dec!(6), 30);
    assert!(
        (payment - dec!(1798.65)).abs() < dec!(0.01),
        "Expected ~1798.65, got {payment}"
    );
}

#[test]
fn test_higher_rate_means_higher_payment() {
    let low = monthly_payment(dec!(1000000), dec!(4), 25);
    let high = monthly_payment(dec!(1000000), dec!(8), 25);
    assert!(high > low);
}

// ===========================================================================
// Schedule round trip
// ===========================================================================

#[test]
fn test_first_year_principal_matches_balance_drop() {
    for (balance, rate, years) in [
        (dec!(2000000), dec!(6.3), 25u32),
        (dec!(3800000), dec!(3), 30),
        (dec!(450000), dec!(9.75), 15),
        (dec!(120000), dec!(0), 10),
    ] {
        let schedule = generate_first_year_schedule(balance, rate, years);
        let principal: Decimal = schedule.iter().map(|row| row.principal).sum();
        let expected = balance - remaining_balance(balance, rate, years, 12);
        assert!(
            (principal - expected).abs() < dec!(0.0001),
            "{balance} at {rate}%: {principal} vs {expected}"
        );

        let last = schedule.rows().pop().unwrap();
        assert!((last.balance - (balance - expected)).abs() < dec!(0.0001));
    }
}

#[test]
fn test_one_year_term_schedule_pays_off() {
    let schedule = generate_first_year_schedule(dec!(12000), dec!(12), 1);
    let rows = schedule.rows();
    assert_eq!(rows.len(), 12);
    assert!(rows[11].balance < dec!(0.0001));
}
