use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::time::Instant;

use seller_finance_core::deal::{self, DealSnapshot};
use seller_finance_core::schedule::{self, LabeledSchedule, SellerSchedule};
use seller_finance_core::seller_note::SellerNoteStructure;
use seller_finance_core::types::with_metadata;

use crate::input;
use crate::input::normalize;

/// Seller note structure as typed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StructureArg {
    Amortized,
    InterestOnly,
    ZeroInterest,
}

impl From<StructureArg> for SellerNoteStructure {
    fn from(arg: StructureArg) -> Self {
        match arg {
            StructureArg::Amortized => SellerNoteStructure::Amortized,
            StructureArg::InterestOnly => SellerNoteStructure::InterestOnly,
            StructureArg::ZeroInterest => SellerNoteStructure::ZeroInterestPrincipalOnly,
        }
    }
}

/// Deal inputs. Amounts accept free text such as "6,000,000" or "$356,000";
/// anything unparseable counts as zero. Flags override values
/// read from `--input` or stdin, which in turn override the built-in
/// sample deal.
#[derive(Args, Debug, Default)]
pub struct DealArgs {
    /// Path to a JSON or YAML deal file
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<String>,

    /// Down payment
    #[arg(long)]
    pub down: Option<String>,

    /// Annual net operating income (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub noi: Option<String>,

    /// First loan principal
    #[arg(long)]
    pub first_balance: Option<String>,

    /// First loan annual rate in percent (6.3 = 6.3%)
    #[arg(long)]
    pub first_rate: Option<String>,

    /// First loan amortization in years
    #[arg(long)]
    pub first_amort: Option<String>,

    /// Year the first loan balloons
    #[arg(long)]
    pub first_balloon: Option<String>,

    /// Leave out the first loan entirely
    #[arg(long)]
    pub no_first_loan: bool,

    /// First loan runs to maturity with no balloon
    #[arg(long)]
    pub no_first_balloon: bool,

    /// Seller note structure
    #[arg(long, value_enum)]
    pub seller_structure: Option<StructureArg>,

    /// Seller note annual rate in percent
    #[arg(long)]
    pub seller_rate: Option<String>,

    /// Seller note amortization in years
    #[arg(long)]
    pub seller_amort: Option<String>,

    /// Year the seller note balloons
    #[arg(long)]
    pub seller_balloon: Option<String>,

    /// Seller note runs to maturity with no balloon
    #[arg(long)]
    pub no_seller_balloon: bool,
}

pub fn run_analyze(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = resolve_snapshot(&args)?;
    let result = deal::analyze_deal(&snapshot);
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let snapshot = resolve_snapshot(&args)?;
    let schedules = schedule::deal_schedules(&snapshot);

    // One entry per instrument: rows when it amortizes, a note when it doesn't
    let mut sections = Map::new();
    if let Some(first) = schedules.first_loan {
        insert_rows(&mut sections, first)?;
    }
    match schedules.seller_note {
        SellerSchedule::NotApplicable => {}
        SellerSchedule::Amortizing(seller) => insert_rows(&mut sections, seller)?,
        SellerSchedule::StructuralNote(note) => {
            sections.insert(schedule::SELLER_NOTE_LABEL.to_string(), json!(note));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "First-year amortization schedule (level monthly payments)",
        &snapshot,
        Vec::new(),
        elapsed,
        Value::Object(sections),
    );
    Ok(serde_json::to_value(output)?)
}

fn insert_rows(
    sections: &mut Map<String, Value>,
    schedule: LabeledSchedule,
) -> Result<(), Box<dyn std::error::Error>> {
    sections.insert(schedule.label, serde_json::to_value(schedule.rows)?);
    Ok(())
}

/// Base snapshot from `--input`, piped stdin, or the sample deal, with
/// flag overrides applied and every field normalized.
pub fn resolve_snapshot(args: &DealArgs) -> Result<DealSnapshot, Box<dyn std::error::Error>> {
    let base: DealSnapshot = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        DealSnapshot::default()
    };

    let mut snapshot = normalized(base);
    apply_overrides(&mut snapshot, args);
    tracing::debug!(?snapshot, "deal inputs resolved");
    Ok(snapshot)
}

/// Clamp file-sourced values the same way typed flags are clamped.
fn normalized(mut snapshot: DealSnapshot) -> DealSnapshot {
    let hundred = Decimal::ONE_HUNDRED;
    let deal = &mut snapshot.deal;
    deal.purchase_price = deal.purchase_price.max(Decimal::ZERO);
    deal.down_payment = deal.down_payment.max(Decimal::ZERO);

    let first = &mut snapshot.first_loan;
    first.balance = first.balance.max(Decimal::ZERO);
    first.annual_rate_pct = first.annual_rate_pct.max(Decimal::ZERO).min(hundred);
    first.amort_years = first.amort_years.max(1);
    first.balloon_years = first.balloon_years.max(1);

    let note = &mut snapshot.seller_note;
    note.annual_rate_pct = note.annual_rate_pct.max(Decimal::ZERO).min(hundred);
    note.amort_years = note.amort_years.max(1);
    note.balloon_years = note.balloon_years.max(1);

    snapshot
}

fn apply_overrides(snapshot: &mut DealSnapshot, args: &DealArgs) {
    let deal = &mut snapshot.deal;
    if let Some(ref v) = args.price {
        deal.purchase_price = normalize::amount_at_least(v, Decimal::ZERO);
    }
    if let Some(ref v) = args.down {
        deal.down_payment = normalize::amount_at_least(v, Decimal::ZERO);
    }
    if let Some(ref v) = args.noi {
        deal.noi = normalize::parse_amount(v);
    }

    let first = &mut snapshot.first_loan;
    if let Some(ref v) = args.first_balance {
        first.balance = normalize::amount_at_least(v, Decimal::ZERO);
    }
    if let Some(ref v) = args.first_rate {
        first.annual_rate_pct = normalize::rate_pct(v);
    }
    if let Some(ref v) = args.first_amort {
        first.amort_years = normalize::years(v);
    }
    if let Some(ref v) = args.first_balloon {
        first.balloon_years = normalize::years(v);
    }
    if args.no_first_loan {
        first.enabled = false;
    }
    if args.no_first_balloon {
        first.balloon_enabled = false;
    }

    let note = &mut snapshot.seller_note;
    if let Some(structure) = args.seller_structure {
        note.structure = structure.into();
    }
    if let Some(ref v) = args.seller_rate {
        note.annual_rate_pct = normalize::rate_pct(v);
    }
    if let Some(ref v) = args.seller_amort {
        note.amort_years = normalize::years(v);
    }
    if let Some(ref v) = args.seller_balloon {
        note.balloon_years = normalize::years(v);
    }
    if args.no_seller_balloon {
        note.balloon_enabled = false;
    }
}
