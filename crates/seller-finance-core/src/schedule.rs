use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{monthly_payment, monthly_rate, term_months};
use crate::deal::DealSnapshot;
use crate::seller_note::{seller_balance, SellerNoteStructure};
use crate::types::{Money, Months, Percent};

/// Only the first year of payments is scheduled.
pub const SCHEDULE_HORIZON_MONTHS: Months = 12;

pub const FIRST_LOAN_LABEL: &str = "First Loan";
pub const SELLER_NOTE_LABEL: &str = "Seller Note";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One month of an amortization trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-indexed
    pub month: Months,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Principal outstanding after this payment
    pub balance: Money,
}

/// A bounded amortization trace. Iterating it always starts again at month 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstYearSchedule {
    opening_balance: Money,
    monthly_rate: Decimal,
    payment: Money,
    months: Months,
}

/// Iterator over the rows of a [`FirstYearSchedule`].
#[derive(Debug, Clone)]
pub struct ScheduleRows<'a> {
    schedule: &'a FirstYearSchedule,
    month: Months,
    remaining: Money,
}

/// A schedule with the instrument it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSchedule {
    pub label: String,
    pub rows: Vec<ScheduleRow>,
}

/// What the seller note contributes to the schedule view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SellerSchedule {
    /// No seller-carried balance
    NotApplicable,
    Amortizing(LabeledSchedule),
    /// Non-amortizing structures are described rather than scheduled
    StructuralNote(String),
}

/// First-year schedules for both instruments of a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSchedules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_loan: Option<LabeledSchedule>,
    pub seller_note: SellerSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Schedule of up to `min(amort_years × 12, 12)` level payments.
pub fn generate_first_year_schedule(
    balance: Money,
    annual_rate_pct: Percent,
    amort_years: u32,
) -> FirstYearSchedule {
    FirstYearSchedule {
        opening_balance: balance,
        monthly_rate: monthly_rate(annual_rate_pct),
        payment: monthly_payment(balance, annual_rate_pct, amort_years),
        months: term_months(amort_years).min(SCHEDULE_HORIZON_MONTHS),
    }
}

impl FirstYearSchedule {
    pub fn iter(&self) -> ScheduleRows<'_> {
        ScheduleRows {
            schedule: self,
            month: 0,
            remaining: self.opening_balance,
        }
    }

    pub fn rows(&self) -> Vec<ScheduleRow> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.months as usize
    }

    pub fn is_empty(&self) -> bool {
        self.months == 0
    }

    /// The constant payment every row carries.
    pub fn payment(&self) -> Money {
        self.payment
    }
}

impl<'a> IntoIterator for &'a FirstYearSchedule {
    type Item = ScheduleRow;
    type IntoIter = ScheduleRows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Iterator for ScheduleRows<'_> {
    type Item = ScheduleRow;

    fn next(&mut self) -> Option<ScheduleRow> {
        if self.month >= self.schedule.months {
            return None;
        }
        self.month += 1;

        let interest = self.remaining * self.schedule.monthly_rate;
        let principal = self.schedule.payment - interest;
        self.remaining = (self.remaining - principal).max(Decimal::ZERO);

        Some(ScheduleRow {
            month: self.month,
            payment: self.schedule.payment,
            principal,
            interest,
            balance: self.remaining,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.schedule.months - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScheduleRows<'_> {}

/// First-year schedules for the deal's first loan and seller note.
///
/// The first loan is scheduled whenever it is enabled. The seller note is
/// scheduled only when it carries a balance under the amortized structure;
/// the other structures yield a note describing their flat payments.
pub fn deal_schedules(snapshot: &DealSnapshot) -> DealSchedules {
    let first = &snapshot.first_loan;
    let first_loan = first.enabled.then(|| LabeledSchedule {
        label: FIRST_LOAN_LABEL.to_string(),
        rows: generate_first_year_schedule(first.balance, first.annual_rate_pct, first.amort_years)
            .rows(),
    });

    let seller_bal = seller_balance(
        snapshot.deal.purchase_price,
        snapshot.deal.down_payment,
        first.effective_balance(),
    );
    let note = &snapshot.seller_note;

    let seller_note = if seller_bal <= Decimal::ZERO {
        SellerSchedule::NotApplicable
    } else {
        match note.structure {
            SellerNoteStructure::Amortized => SellerSchedule::Amortizing(LabeledSchedule {
                label: SELLER_NOTE_LABEL.to_string(),
                rows: generate_first_year_schedule(seller_bal, note.annual_rate_pct, note.amort_years)
                    .rows(),
            }),
            SellerNoteStructure::InterestOnly => SellerSchedule::StructuralNote(
                "Interest-only payments shown. Principal due at balloon or maturity.".to_string(),
            ),
            SellerNoteStructure::ZeroInterestPrincipalOnly => SellerSchedule::StructuralNote(
                "Zero-interest principal-only payments. Equal principal installments with no interest."
                    .to_string(),
            ),
        }
    };

    DealSchedules {
        first_loan,
        seller_note,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
