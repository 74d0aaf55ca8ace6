use clap::{Args, Subcommand};
use serde_json::{json, Value};

use seller_finance_core::deal;
use seller_finance_core::scenario::ScenarioStore;

use crate::commands::deal::{resolve_snapshot, DealArgs};
use crate::input;

/// Arguments for the saved-scenario commands
#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario store file (JSON); created on first save
    #[arg(long, env = "SFC_STORE", default_value = "scenarios.json", global = true)]
    pub store: String,

    #[command(subcommand)]
    pub action: ScenarioAction,
}

#[derive(Subcommand)]
pub enum ScenarioAction {
    /// Analyze a deal and save its inputs and headline results
    Save {
        /// Scenario name (must not be blank)
        name: String,

        #[command(flatten)]
        deal: DealArgs,
    },
    /// List saved scenarios, oldest first
    List,
    /// Re-run a saved scenario's inputs
    Load {
        /// Zero-based position in the list
        index: usize,

        /// Print the stored inputs instead of analyzing them
        #[arg(long)]
        inputs_only: bool,
    },
    /// Delete a saved scenario (out-of-range indexes are ignored)
    Delete {
        /// Zero-based position in the list
        index: usize,
    },
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = open_store(&args.store)?;

    match args.action {
        ScenarioAction::Save { name, deal: deal_args } => {
            let snapshot = resolve_snapshot(&deal_args)?;
            let analysis = deal::analyze_deal(&snapshot);
            store.save_analysis(&name, &snapshot, &analysis.result)?;
            persist(&args.store, &store)?;
            Ok(summaries(&store))
        }
        ScenarioAction::List => Ok(summaries(&store)),
        ScenarioAction::Load { index, inputs_only } => {
            let snapshot = store.load(index)?;
            if inputs_only {
                return Ok(serde_json::to_value(snapshot)?);
            }
            Ok(serde_json::to_value(deal::analyze_deal(&snapshot))?)
        }
        ScenarioAction::Delete { index } => {
            let removed = store.delete(index);
            if removed.is_some() {
                persist(&args.store, &store)?;
            }
            Ok(json!({
                "deleted": removed.as_ref().map(|s| s.name()),
                "remaining": store.len(),
            }))
        }
    }
}

fn open_store(path: &str) -> Result<ScenarioStore, Box<dyn std::error::Error>> {
    match input::file::read_optional(path)? {
        Some(text) => Ok(ScenarioStore::from_json(&text)?),
        None => {
            tracing::debug!(path, "no scenario store yet, starting empty");
            Ok(ScenarioStore::new())
        }
    }
}

fn persist(path: &str, store: &ScenarioStore) -> Result<(), Box<dyn std::error::Error>> {
    input::file::write_string(path, &store.to_json()?)?;
    tracing::debug!(path, count = store.len(), "scenario store written");
    Ok(())
}

/// One flat row per scenario for listing.
fn summaries(store: &ScenarioStore) -> Value {
    let rows: Vec<Value> = store
        .list()
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let r = s.results();
            json!({
                "index": index,
                "name": s.name(),
                "saved_at": s.saved_at().to_rfc3339(),
                "dscr": r.dscr,
                "cap_rate_pct": r.cap_rate_pct,
                "coc_return_pct": r.coc_return_pct,
                "total_ltv_pct": r.total_ltv_pct,
                "annual_cash_flow": r.annual_cash_flow,
            })
        })
        .collect();
    Value::Array(rows)
}
