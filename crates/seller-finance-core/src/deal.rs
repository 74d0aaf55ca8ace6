use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::{compute_first_loan, ComputedLoanResult, LoanTerms};
use crate::seller_note::{compute_seller_note, seller_balance, SellerNoteStructure, SellerNoteTerms};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Ratio};

/// DSCR mapped to a deal score of 0
const SCORE_DSCR_FLOOR: Decimal = dec!(0.9);
/// DSCR mapped to a deal score of 100
const SCORE_DSCR_CEILING: Decimal = dec!(1.6);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Purchase-side inputs of the deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealInputs {
    pub purchase_price: Money,
    pub down_payment: Money,
    /// Annual net operating income; may be negative
    pub noi: Money,
}

/// The complete input triple the engine consumes. Scenarios store exactly
/// this, so loading one overwrites all current inputs at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSnapshot {
    pub deal: DealInputs,
    pub first_loan: LoanTerms,
    pub seller_note: SellerNoteTerms,
}

impl Default for DealSnapshot {
    /// A $6M purchase: 200k down, 2M first at 6.3%/25y with a 10-year
    /// balloon, the rest seller-carried at 3%/30y with an 8-year balloon.
    fn default() -> Self {
        DealSnapshot {
            deal: DealInputs {
                purchase_price: dec!(6000000),
                down_payment: dec!(200000),
                noi: dec!(356000),
            },
            first_loan: LoanTerms {
                balance: dec!(2000000),
                annual_rate_pct: dec!(6.3),
                amort_years: 25,
                balloon_years: 10,
                balloon_enabled: true,
                enabled: true,
            },
            seller_note: SellerNoteTerms {
                structure: SellerNoteStructure::Amortized,
                annual_rate_pct: dec!(3),
                amort_years: 30,
                balloon_years: 8,
                balloon_enabled: true,
            },
        }
    }
}

/// Qualitative read of debt coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Smoking deal")]
    SmokingDeal,
    Great,
    Solid,
    Decent,
    Weak,
    #[serde(rename = "Bad deal")]
    BadDeal,
    /// No debt service, so coverage is undefined and the deal is not rated
    #[serde(rename = "No debt service")]
    NoDebtService,
}

impl Verdict {
    /// Threshold ladder, evaluated top-down; lower bounds are inclusive.
    pub fn from_dscr(dscr: Ratio) -> Self {
        if dscr >= dec!(1.55) {
            Self::SmokingDeal
        } else if dscr >= dec!(1.35) {
            Self::Great
        } else if dscr >= dec!(1.20) {
            Self::Solid
        } else if dscr >= dec!(1.15) {
            Self::Decent
        } else if dscr >= dec!(1.00) {
            Self::Weak
        } else {
            Self::BadDeal
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmokingDeal => write!(f, "Smoking deal"),
            Self::Great => write!(f, "Great"),
            Self::Solid => write!(f, "Solid"),
            Self::Decent => write!(f, "Decent"),
            Self::Weak => write!(f, "Weak"),
            Self::BadDeal => write!(f, "Bad deal"),
            Self::NoDebtService => write!(f, "No debt service"),
        }
    }
}

/// Aggregate deal metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealScorecard {
    pub total_monthly_debt: Money,
    pub total_annual_debt: Money,
    /// NOI − total annual debt service
    pub annual_cash_flow: Money,
    pub monthly_cash_flow: Money,
    /// NOI / annual debt service; `None` when there is no debt service
    pub dscr: Option<Ratio>,
    pub cap_rate_pct: Percent,
    pub coc_return_pct: Percent,
    pub total_ltv_pct: Percent,
    pub first_ltv_pct: Percent,
    /// 0–100 linear in DSCR over [0.9, 1.6]; `None` when DSCR is undefined
    pub deal_score: Option<u32>,
    pub verdict: Verdict,
    pub warnings: Vec<String>,
}

/// Full analysis of one deal snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    /// Derived seller-carried principal
    pub seller_balance: Money,
    pub first_loan: ComputedLoanResult,
    pub seller_note: ComputedLoanResult,
    pub scorecard: DealScorecard,
    /// Combined principal due at the balloon dates of both instruments
    pub total_balloon_exposure: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run both instruments and the deal metrics over a snapshot.
///
/// Every figure is recomputed from scratch; the function is total and the
/// returned envelope carries the input-consistency warnings in order.
pub fn analyze_deal(snapshot: &DealSnapshot) -> ComputationOutput<DealAnalysis> {
    let start = Instant::now();

    let deal = &snapshot.deal;
    let first_balance = snapshot.first_loan.effective_balance();
    let seller_bal = seller_balance(deal.purchase_price, deal.down_payment, first_balance);

    let first = compute_first_loan(&snapshot.first_loan);
    let seller = compute_seller_note(&snapshot.seller_note, seller_bal);
    let scorecard = compute_scorecard(deal, first_balance, seller_bal, &first, &seller);

    // Disabled balloons already report zero
    let total_balloon_exposure = first.balance_at_balloon + seller.balance_at_balloon;

    tracing::debug!(
        seller_balance = %seller_bal,
        total_annual_debt = %scorecard.total_annual_debt,
        dscr = ?scorecard.dscr,
        deal_score = ?scorecard.deal_score,
        verdict = %scorecard.verdict,
        warnings = scorecard.warnings.len(),
        "deal analyzed"
    );

    let warnings = scorecard.warnings.clone();
    let output = DealAnalysis {
        seller_balance: seller_bal,
        first_loan: first,
        seller_note: seller,
        scorecard,
        total_balloon_exposure,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Seller-Financed Deal Analysis (30/360 monthly amortization)",
        snapshot,
        warnings,
        elapsed,
        output,
    )
}

/// Combine both instruments' results with the purchase inputs.
pub fn compute_scorecard(
    deal: &DealInputs,
    first_balance: Money,
    seller_bal: Money,
    first: &ComputedLoanResult,
    seller: &ComputedLoanResult,
) -> DealScorecard {
    let total_monthly_debt = first.monthly_payment + seller.monthly_payment;
    let total_annual_debt = first.annual_payment + seller.annual_payment;
    let annual_cash_flow = deal.noi - total_annual_debt;
    let monthly_cash_flow = annual_cash_flow / dec!(12);

    let dscr = if total_annual_debt > Decimal::ZERO {
        Some(saturating_div(deal.noi, total_annual_debt))
    } else {
        None
    };

    let cap_rate_pct = percent_of(deal.noi, deal.purchase_price);
    let coc_return_pct = percent_of(annual_cash_flow, deal.down_payment);
    let total_ltv_pct = percent_of(first_balance + seller_bal, deal.purchase_price);
    let first_ltv_pct = percent_of(first_balance, deal.purchase_price);

    DealScorecard {
        total_monthly_debt,
        total_annual_debt,
        annual_cash_flow,
        monthly_cash_flow,
        dscr,
        cap_rate_pct,
        coc_return_pct,
        total_ltv_pct,
        first_ltv_pct,
        deal_score: deal_score(dscr),
        verdict: verdict(dscr),
        warnings: validation_warnings(deal, first_balance, seller_bal),
    }
}

/// Clamped linear map of DSCR from [0.9, 1.6] onto [0, 100], rounded half up.
pub fn deal_score(dscr: Option<Ratio>) -> Option<u32> {
    let dscr = dscr?;
    // Clamp first: coverage can saturate near Decimal::MAX
    if dscr <= SCORE_DSCR_FLOOR {
        return Some(0);
    }
    if dscr >= SCORE_DSCR_CEILING {
        return Some(100);
    }
    let scaled = (dscr - SCORE_DSCR_FLOOR) / (SCORE_DSCR_CEILING - SCORE_DSCR_FLOOR) * dec!(100);
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Verdict for an optional DSCR; a debt-free deal is not rated.
pub fn verdict(dscr: Option<Ratio>) -> Verdict {
    match dscr {
        Some(d) => Verdict::from_dscr(d),
        None => Verdict::NoDebtService,
    }
}

/// Input-consistency warnings, in a fixed order.
pub fn validation_warnings(deal: &DealInputs, first_balance: Money, seller_bal: Money) -> Vec<String> {
    let mut warnings = Vec::new();

    if deal.down_payment > deal.purchase_price {
        warnings.push("Down payment exceeds purchase price".to_string());
    }
    if first_balance > deal.purchase_price {
        warnings.push("First loan exceeds purchase price".to_string());
    }
    if deal.down_payment + first_balance > deal.purchase_price {
        warnings.push("Down payment + first loan exceeds purchase price".to_string());
    }
    if deal.noi < Decimal::ZERO {
        warnings.push("NOI is negative".to_string());
    }
    // Unreachable through seller_balance(), kept for externally supplied balances
    if seller_bal < Decimal::ZERO {
        warnings.push("Seller balance is negative (check your inputs)".to_string());
    }

    warnings
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `part / whole × 100`, or zero when `whole` is not positive.
fn percent_of(part: Money, whole: Money) -> Percent {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    saturating_div(part, whole)
        .checked_mul(dec!(100))
        .unwrap_or_else(|| saturated(part))
}

fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator
        .checked_div(denominator)
        .unwrap_or_else(|| saturated(numerator))
}

fn saturated(sign_source: Decimal) -> Decimal {
    if sign_source.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(price: Decimal, down: Decimal, noi: Decimal) -> DealInputs {
        DealInputs {
            purchase_price: price,
            down_payment: down,
            noi,
        }
    }

    fn loan(monthly: Decimal) -> ComputedLoanResult {
        ComputedLoanResult {
            monthly_payment: monthly,
            annual_payment: monthly * dec!(12),
            balance_at_balloon: Decimal::ZERO,
        }
    }

    // --- Verdict ladder ---

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_dscr(dec!(1.60)), Verdict::SmokingDeal);
        assert_eq!(Verdict::from_dscr(dec!(1.55)), Verdict::SmokingDeal);
        assert_eq!(Verdict::from_dscr(dec!(1.549999)), Verdict::Great);
        assert_eq!(Verdict::from_dscr(dec!(1.35)), Verdict::Great);
        assert_eq!(Verdict::from_dscr(dec!(1.20)), Verdict::Solid);
        assert_eq!(Verdict::from_dscr(dec!(1.199999)), Verdict::Decent);
        assert_eq!(Verdict::from_dscr(dec!(1.15)), Verdict::Decent);
        assert_eq!(Verdict::from_dscr(dec!(1.00)), Verdict::Weak);
        assert_eq!(Verdict::from_dscr(dec!(0.999999)), Verdict::BadDeal);
        assert_eq!(Verdict::from_dscr(dec!(-2)), Verdict::BadDeal);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::SmokingDeal.to_string(), "Smoking deal");
        assert_eq!(Verdict::BadDeal.to_string(), "Bad deal");
        assert_eq!(Verdict::NoDebtService.to_string(), "No debt service");
    }

    // --- Deal score ---

    #[test]
    fn test_deal_score_endpoints_and_clamp() {
        assert_eq!(deal_score(Some(dec!(0.9))), Some(0));
        assert_eq!(deal_score(Some(dec!(1.6))), Some(100));
        assert_eq!(deal_score(Some(dec!(0.2))), Some(0));
        assert_eq!(deal_score(Some(dec!(4.0))), Some(100));
        assert_eq!(deal_score(Some(dec!(1.25))), Some(50));
    }

    #[test]
    fn test_deal_score_rounds_half_up() {
        // (0.9035 − 0.9) / 0.7 × 100 = 0.5
        assert_eq!(deal_score(Some(dec!(0.9035))), Some(1));
        // 2.5 → 3 where banker's rounding would give 2
        assert_eq!(deal_score(Some(dec!(0.9175))), Some(3));
    }

    #[test]
    fn test_no_dscr_is_unrated() {
        assert_eq!(deal_score(None), None);
        assert_eq!(verdict(None), Verdict::NoDebtService);
    }

    // --- Scorecard ---

    #[test]
    fn test_scorecard_metrics() {
        let deal = inputs(dec!(1000000), dec!(250000), dec!(120000));
        let card = compute_scorecard(
            &deal,
            dec!(500000),
            dec!(250000),
            &loan(dec!(5000)),
            &loan(dec!(2500)),
        );

        assert_eq!(card.total_monthly_debt, dec!(7500));
        assert_eq!(card.total_annual_debt, dec!(90000));
        assert_eq!(card.annual_cash_flow, dec!(30000));
        assert_eq!(card.monthly_cash_flow, dec!(2500));
        assert_eq!(card.dscr, Some(dec!(120000) / dec!(90000)));
        assert_eq!(card.cap_rate_pct, dec!(12));
        assert_eq!(card.coc_return_pct, dec!(12));
        assert_eq!(card.total_ltv_pct, dec!(75));
        assert_eq!(card.first_ltv_pct, dec!(50));
        // 1.333x sits between the Solid and Great thresholds
        assert_eq!(card.verdict, Verdict::Solid);
        assert_eq!(card.deal_score, Some(62));
        assert!(card.warnings.is_empty());
    }

    #[test]
    fn test_zero_price_and_down_fall_back_to_zero() {
        let deal = inputs(Decimal::ZERO, Decimal::ZERO, dec!(50000));
        let card = compute_scorecard(
            &deal,
            Decimal::ZERO,
            Decimal::ZERO,
            &ComputedLoanResult::NONE,
            &ComputedLoanResult::NONE,
        );
        assert_eq!(card.cap_rate_pct, Decimal::ZERO);
        assert_eq!(card.coc_return_pct, Decimal::ZERO);
        assert_eq!(card.total_ltv_pct, Decimal::ZERO);
        assert_eq!(card.first_ltv_pct, Decimal::ZERO);
    }

    #[test]
    fn test_no_debt_dscr_is_none_not_zero() {
        let deal = inputs(dec!(1000000), dec!(1000000), dec!(80000));
        let card = compute_scorecard(
            &deal,
            Decimal::ZERO,
            Decimal::ZERO,
            &ComputedLoanResult::NONE,
            &ComputedLoanResult::NONE,
        );
        assert_eq!(card.dscr, None);
        assert_ne!(card.dscr, Some(Decimal::ZERO));
        assert_eq!(card.deal_score, None);
        assert_eq!(card.verdict, Verdict::NoDebtService);
        assert_eq!(card.annual_cash_flow, dec!(80000));
    }

    // --- Warnings ---

    #[test]
    fn test_warnings_in_order() {
        let deal = inputs(dec!(100000), dec!(150000), dec!(-5000));
        let warnings = validation_warnings(&deal, dec!(120000), dec!(-1));
        assert_eq!(
            warnings,
            vec![
                "Down payment exceeds purchase price",
                "First loan exceeds purchase price",
                "Down payment + first loan exceeds purchase price",
                "NOI is negative",
                "Seller balance is negative (check your inputs)",
            ]
        );
    }

    #[test]
    fn test_combined_financing_warning_alone() {
        let deal = inputs(dec!(100000), dec!(60000), dec!(10000));
        let warnings = validation_warnings(&deal, dec!(50000), Decimal::ZERO);
        assert_eq!(warnings, vec!["Down payment + first loan exceeds purchase price"]);
    }

    // --- Full analysis ---

    #[test]
    fn test_default_snapshot_analysis() {
        let output = analyze_deal(&DealSnapshot::default());
        let analysis = &output.result;

        assert_eq!(analysis.seller_balance, dec!(3800000));
        assert!(analysis.first_loan.monthly_payment > Decimal::ZERO);
        assert!(analysis.seller_note.monthly_payment > Decimal::ZERO);
        assert_eq!(
            analysis.total_balloon_exposure,
            analysis.first_loan.balance_at_balloon + analysis.seller_note.balance_at_balloon
        );
        assert!(analysis.scorecard.dscr.is_some());
        assert!(output.warnings.is_empty());
        assert_eq!(
            output.methodology,
            "Seller-Financed Deal Analysis (30/360 monthly amortization)"
        );
    }

    #[test]
    fn test_disabled_first_loan_moves_principal_to_seller() {
        let mut snapshot = DealSnapshot::default();
        snapshot.first_loan.enabled = false;
        let analysis = analyze_deal(&snapshot).result;

        assert_eq!(analysis.seller_balance, dec!(5800000));
        assert_eq!(analysis.first_loan, ComputedLoanResult::NONE);
        assert_eq!(analysis.scorecard.first_ltv_pct, Decimal::ZERO);
    }

    #[test]
    fn test_warnings_flow_into_envelope() {
        let mut snapshot = DealSnapshot::default();
        snapshot.deal.noi = dec!(-1000);
        let output = analyze_deal(&snapshot);
        assert_eq!(output.warnings, output.result.scorecard.warnings);
        assert_eq!(output.warnings, vec!["NOI is negative"]);
        assert_eq!(output.result.scorecard.verdict, Verdict::BadDeal);
    }
}
