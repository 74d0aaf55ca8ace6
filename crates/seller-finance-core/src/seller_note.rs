use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{monthly_payment, monthly_rate, remaining_balance, term_months};
use crate::loan::ComputedLoanResult;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Repayment structure of the seller-carried note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellerNoteStructure {
    /// Level payments of principal and interest, like the first loan
    #[default]
    Amortized,
    /// Interest only; the whole principal is due at balloon or maturity
    InterestOnly,
    /// Equal principal installments, no interest (rate is ignored)
    ZeroInterestPrincipalOnly,
}

impl SellerNoteStructure {
    /// Only amortized notes get a month-by-month schedule.
    pub fn is_amortizing(&self) -> bool {
        matches!(self, Self::Amortized)
    }
}

impl std::fmt::Display for SellerNoteStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amortized => write!(f, "Amortized"),
            Self::InterestOnly => write!(f, "Interest Only"),
            Self::ZeroInterestPrincipalOnly => write!(f, "Zero Interest (Principal Only)"),
        }
    }
}

/// Terms of the seller note. The principal is never stored here: it is
/// whatever the down payment and first loan leave uncovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerNoteTerms {
    pub structure: SellerNoteStructure,
    /// Annual rate in percent; ignored for `ZeroInterestPrincipalOnly`
    pub annual_rate_pct: Percent,
    pub amort_years: u32,
    pub balloon_years: u32,
    pub balloon_enabled: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Seller-carried principal: `max(price − down − first, 0)`.
pub fn seller_balance(purchase_price: Money, down_payment: Money, first_balance: Money) -> Money {
    (purchase_price - down_payment - first_balance).max(Decimal::ZERO)
}

/// Payment and balloon figures for the seller note on a derived `balance`.
pub fn compute_seller_note(terms: &SellerNoteTerms, balance: Money) -> ComputedLoanResult {
    if balance <= Decimal::ZERO {
        return ComputedLoanResult::NONE;
    }

    match terms.structure {
        SellerNoteStructure::Amortized => amortized(terms, balance),
        SellerNoteStructure::InterestOnly => interest_only(terms, balance),
        SellerNoteStructure::ZeroInterestPrincipalOnly => principal_only(terms, balance),
    }
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

fn amortized(terms: &SellerNoteTerms, balance: Money) -> ComputedLoanResult {
    let monthly = monthly_payment(balance, terms.annual_rate_pct, terms.amort_years);
    let balance_at_balloon = if terms.balloon_enabled {
        remaining_balance(
            balance,
            terms.annual_rate_pct,
            terms.amort_years,
            term_months(terms.balloon_years),
        )
    } else {
        Decimal::ZERO
    };
    ComputedLoanResult::from_monthly(monthly, balance_at_balloon)
}

fn interest_only(terms: &SellerNoteTerms, balance: Money) -> ComputedLoanResult {
    let monthly = balance * monthly_rate(terms.annual_rate_pct);
    // Principal never amortizes, so all of it is due at the balloon
    let balance_at_balloon = if terms.balloon_enabled {
        balance
    } else {
        Decimal::ZERO
    };
    ComputedLoanResult::from_monthly(monthly, balance_at_balloon)
}

fn principal_only(terms: &SellerNoteTerms, balance: Money) -> ComputedLoanResult {
    let n = term_months(terms.amort_years);
    let monthly = if n > 0 {
        balance / Decimal::from(n)
    } else {
        Decimal::ZERO
    };
    let balance_at_balloon = if terms.balloon_enabled {
        let paid_months = term_months(terms.balloon_years).min(n);
        (balance - Decimal::from(paid_months) * monthly).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    ComputedLoanResult::from_monthly(monthly, balance_at_balloon)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
