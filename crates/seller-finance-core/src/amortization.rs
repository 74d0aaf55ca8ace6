use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Months, Percent};

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Rate and term conversion
// ---------------------------------------------------------------------------

/// Monthly periodic rate from an annual percentage: 6.3 -> 0.00525.
pub fn monthly_rate(annual_rate_pct: Percent) -> Decimal {
    annual_rate_pct / dec!(100) / dec!(12)
}

/// Number of monthly periods in an amortization term.
pub fn term_months(amort_years: u32) -> Months {
    amort_years.saturating_mul(MONTHS_PER_YEAR)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment that fully amortizes `balance` over `amort_years`.
///
/// Zero-rate loans amortize straight-line (`balance / n`). Returns zero for a
/// non-positive balance or a zero-year term. Callers floor years at 1 and
/// clamp rates to `[0, 100]` before calling.
pub fn monthly_payment(balance: Money, annual_rate_pct: Percent, amort_years: u32) -> Money {
    if balance <= Decimal::ZERO || amort_years == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_pct);
    let n = term_months(amort_years);

    if r.is_zero() {
        return balance / Decimal::from(n);
    }

    match compound_factor(r, n) {
        // payment = B·r / (1 − (1+r)^−n)
        Some(factor) => {
            let discount = Decimal::ONE - Decimal::ONE / factor;
            if discount.is_zero() {
                return Decimal::ZERO;
            }
            balance * r / discount
        }
        // (1+r)^n beyond the decimal range: (1+r)^−n is below resolution
        None => balance * r,
    }
}

/// Outstanding principal after `elapsed_months` level payments.
///
/// `elapsed_months` is clamped to the amortization term, so asking past
/// maturity returns the balance at maturity (zero for a fully amortizing
/// loan). The result is never negative.
pub fn remaining_balance(
    balance: Money,
    annual_rate_pct: Percent,
    amort_years: u32,
    elapsed_months: Months,
) -> Money {
    if balance <= Decimal::ZERO || amort_years == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_pct);
    let n = term_months(amort_years);
    let m = elapsed_months.min(n);
    if r.is_zero() {
        let payment = monthly_payment(balance, annual_rate_pct, amort_years);
        return (balance - payment * Decimal::from(m)).max(Decimal::ZERO);
    }

    // (1+r)^n beyond the decimal range: the payment is interest only and
    // (1+r)^m / (1+r)^n is below resolution, so principal has not moved
    let remaining = closed_form_balance(balance, r, m, n).unwrap_or(balance);

    remaining.max(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Compounding helpers
// ---------------------------------------------------------------------------

/// (1 + r)^periods by repeated squaring; `None` on decimal overflow.
fn compound_factor(r: Decimal, periods: Months) -> Option<Decimal> {
    let mut base = Decimal::ONE + r;
    let mut factor = Decimal::ONE;
    let mut exp = periods;
    while exp > 0 {
        if exp & 1 == 1 {
            factor = factor.checked_mul(base)?;
        }
        exp >>= 1;
        // Skip the trailing square, it is never used and may overflow
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(factor)
}

/// B·(1+r)^m − P·((1+r)^m − 1)/r with the level payment substituted:
/// B·((1+r)^n − (1+r)^m) / ((1+r)^n − 1). Exact at m = 0 and m = n.
fn closed_form_balance(balance: Money, r: Decimal, m: Months, n: Months) -> Option<Money> {
    let full_term = compound_factor(r, n)?;
    let elapsed = compound_factor(r, m)?;
    let outstanding = (full_term - elapsed).checked_div(full_term - Decimal::ONE)?;
    balance.checked_mul(outstanding)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
