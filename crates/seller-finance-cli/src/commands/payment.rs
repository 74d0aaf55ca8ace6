use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use seller_finance_core::amortization;
use seller_finance_core::types::with_metadata;

use crate::input::normalize;

/// Arguments for a single-loan payment quote
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub balance: String,

    /// Annual rate in percent (6.3 = 6.3%)
    #[arg(long)]
    pub rate: String,

    /// Amortization in years
    #[arg(long)]
    pub years: String,

    /// Also report the balance after this many payments
    #[arg(long)]
    pub elapsed_months: Option<u32>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let balance = normalize::amount_at_least(&args.balance, Decimal::ZERO);
    let rate = normalize::rate_pct(&args.rate);
    let years = normalize::years(&args.years);

    let monthly = amortization::monthly_payment(balance, rate, years);
    let mut result = json!({
        "monthly_payment": monthly,
        "annual_payment": monthly * Decimal::from(12),
        "term_months": amortization::term_months(years),
    });
    if let Some(elapsed) = args.elapsed_months {
        result["elapsed_months"] = json!(elapsed);
        result["remaining_balance"] =
            json!(amortization::remaining_balance(balance, rate, years, elapsed));
    }

    let assumptions = json!({
        "balance": balance,
        "annual_rate_pct": rate,
        "amort_years": years,
    });
    let elapsed_us = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Level-payment amortization (monthly compounding)",
        &assumptions,
        Vec::new(),
        elapsed_us,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
