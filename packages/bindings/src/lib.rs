use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use seller_finance_core::deal::DealSnapshot;
use seller_finance_core::scenario::ScenarioStore;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Decimals cross the boundary as strings so no precision is lost.
fn parse_decimal(field: &str, text: &str) -> NapiResult<Decimal> {
    Decimal::from_str(text.trim()).map_err(|e| to_napi_error(format!("{field}: {e}")))
}

fn parse_snapshot(input_json: &str) -> NapiResult<DealSnapshot> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn parse_store(store_json: &str) -> NapiResult<ScenarioStore> {
    if store_json.trim().is_empty() {
        return Ok(ScenarioStore::new());
    }
    ScenarioStore::from_json(store_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Deal
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let snapshot = parse_snapshot(&input_json)?;
    let output = seller_finance_core::deal::analyze_deal(&snapshot);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn deal_schedules(input_json: String) -> NapiResult<String> {
    let snapshot = parse_snapshot(&input_json)?;
    let output = seller_finance_core::schedule::deal_schedules(&snapshot);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_deal() -> NapiResult<String> {
    serde_json::to_string(&DealSnapshot::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(
    balance: String,
    annual_rate_pct: String,
    amort_years: u32,
) -> NapiResult<String> {
    let balance = parse_decimal("balance", &balance)?;
    let rate = parse_decimal("annual_rate_pct", &annual_rate_pct)?;
    Ok(seller_finance_core::amortization::monthly_payment(balance, rate, amort_years).to_string())
}

#[napi]
pub fn remaining_balance(
    balance: String,
    annual_rate_pct: String,
    amort_years: u32,
    elapsed_months: u32,
) -> NapiResult<String> {
    let balance = parse_decimal("balance", &balance)?;
    let rate = parse_decimal("annual_rate_pct", &annual_rate_pct)?;
    let remaining = seller_finance_core::amortization::remaining_balance(
        balance,
        rate,
        amort_years,
        elapsed_months,
    );
    Ok(remaining.to_string())
}

// ---------------------------------------------------------------------------
// Scenarios
//
// The store lives on the JS side as a JSON string; each call takes the
// current store and returns the updated one.
// ---------------------------------------------------------------------------

#[napi]
pub fn save_scenario(store_json: String, name: String, input_json: String) -> NapiResult<String> {
    let mut store = parse_store(&store_json)?;
    let snapshot = parse_snapshot(&input_json)?;
    let analysis = seller_finance_core::deal::analyze_deal(&snapshot);
    store
        .save_analysis(&name, &snapshot, &analysis.result)
        .map_err(to_napi_error)?;
    store.to_json().map_err(to_napi_error)
}

#[napi]
pub fn load_scenario(store_json: String, index: u32) -> NapiResult<String> {
    let store = parse_store(&store_json)?;
    let snapshot = store.load(index as usize).map_err(to_napi_error)?;
    serde_json::to_string(&snapshot).map_err(to_napi_error)
}

#[napi]
pub fn delete_scenario(store_json: String, index: u32) -> NapiResult<String> {
    let mut store = parse_store(&store_json)?;
    store.delete(index as usize);
    store.to_json().map_err(to_napi_error)
}
