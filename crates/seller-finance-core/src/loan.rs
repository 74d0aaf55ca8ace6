use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{monthly_payment, remaining_balance, term_months};
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Terms of the conventional ("first") loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Original principal
    pub balance: Money,
    /// Annual interest rate in percent (6.3 = 6.3%)
    pub annual_rate_pct: Percent,
    /// Amortization period in years (floored at 1 by the caller)
    pub amort_years: u32,
    /// Year at which the remaining principal falls due
    pub balloon_years: u32,
    /// Whether a balloon is projected at `balloon_years`
    pub balloon_enabled: bool,
    /// A disabled loan contributes nothing to the deal
    pub enabled: bool,
}

impl LoanTerms {
    /// Principal actually in the deal: zero when the loan is switched off.
    pub fn effective_balance(&self) -> Money {
        if self.enabled {
            self.balance
        } else {
            Decimal::ZERO
        }
    }
}

/// Payment and balloon figures for one loan instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedLoanResult {
    pub monthly_payment: Money,
    /// 12 × monthly payment
    pub annual_payment: Money,
    /// Principal outstanding at the balloon date (zero when no balloon)
    pub balance_at_balloon: Money,
}

impl ComputedLoanResult {
    /// Result for an instrument that is absent from the deal.
    pub const NONE: ComputedLoanResult = ComputedLoanResult {
        monthly_payment: Decimal::ZERO,
        annual_payment: Decimal::ZERO,
        balance_at_balloon: Decimal::ZERO,
    };

    pub(crate) fn from_monthly(monthly_payment: Money, balance_at_balloon: Money) -> Self {
        ComputedLoanResult {
            monthly_payment,
            annual_payment: monthly_payment * Decimal::from(12),
            balance_at_balloon,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level payment, annual debt service and balloon balance for the first loan.
pub fn compute_first_loan(terms: &LoanTerms) -> ComputedLoanResult {
    if !terms.enabled {
        return ComputedLoanResult::NONE;
    }

    let monthly = monthly_payment(terms.balance, terms.annual_rate_pct, terms.amort_years);
    let balance_at_balloon = if terms.balloon_enabled {
        remaining_balance(
            terms.balance,
            terms.annual_rate_pct,
            terms.amort_years,
            term_months(terms.balloon_years),
        )
    } else {
        Decimal::ZERO
    };

    ComputedLoanResult::from_monthly(monthly, balance_at_balloon)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
