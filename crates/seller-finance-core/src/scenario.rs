use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deal::{DealAnalysis, DealScorecard, DealSnapshot};
use crate::error::SellerFinanceError;
use crate::types::{Money, Percent, Ratio};
use crate::SellerFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Headline results kept alongside a saved scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResults {
    pub dscr: Option<Ratio>,
    pub cap_rate_pct: Percent,
    pub coc_return_pct: Percent,
    pub total_ltv_pct: Percent,
    pub annual_cash_flow: Money,
}

impl From<&DealScorecard> for ScenarioResults {
    fn from(card: &DealScorecard) -> Self {
        ScenarioResults {
            dscr: card.dscr,
            cap_rate_pct: card.cap_rate_pct,
            coc_return_pct: card.coc_return_pct,
            total_ltv_pct: card.total_ltv_pct,
            annual_cash_flow: card.annual_cash_flow,
        }
    }
}

/// A named, timestamped snapshot of inputs and results. Read-only once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    saved_at: DateTime<Utc>,
    inputs: DealSnapshot,
    results: ScenarioResults,
}

impl Scenario {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    pub fn inputs(&self) -> &DealSnapshot {
        &self.inputs
    }

    pub fn results(&self) -> &ScenarioResults {
        &self.results
    }
}

/// Ordered, in-memory collection of saved scenarios (oldest first).
///
/// Single-writer: callers sharing a store across threads wrap it themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario stamped with the current time.
    ///
    /// A blank or whitespace-only name is rejected and the store is left
    /// untouched.
    pub fn save(
        &mut self,
        name: &str,
        inputs: DealSnapshot,
        results: ScenarioResults,
    ) -> SellerFinanceResult<&[Scenario]> {
        if name.trim().is_empty() {
            tracing::warn!("scenario save rejected: blank name");
            return Err(SellerFinanceError::InvalidInput {
                field: "name".into(),
                reason: "Scenario name must not be blank".into(),
            });
        }

        self.scenarios.push(Scenario {
            name: name.to_string(),
            saved_at: Utc::now(),
            inputs,
            results,
        });
        tracing::info!(name, count = self.scenarios.len(), "scenario saved");

        Ok(&self.scenarios)
    }

    /// Save the inputs of an analysis together with its headline results.
    pub fn save_analysis(
        &mut self,
        name: &str,
        inputs: &DealSnapshot,
        analysis: &DealAnalysis,
    ) -> SellerFinanceResult<&[Scenario]> {
        self.save(name, inputs.clone(), ScenarioResults::from(&analysis.scorecard))
    }

    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    /// Remove the scenario at `index`; out of range is a no-op returning `None`.
    pub fn delete(&mut self, index: usize) -> Option<Scenario> {
        if index >= self.scenarios.len() {
            tracing::debug!(index, count = self.scenarios.len(), "scenario delete ignored");
            return None;
        }
        let removed = self.scenarios.remove(index);
        tracing::info!(name = removed.name.as_str(), index, "scenario deleted");
        Some(removed)
    }

    /// Copy of the stored inputs, to replace the caller's current inputs wholesale.
    pub fn load(&self, index: usize) -> SellerFinanceResult<DealSnapshot> {
        self.scenarios
            .get(index)
            .map(|s| s.inputs.clone())
            .ok_or_else(|| SellerFinanceError::ScenarioNotFound {
                index,
                len: self.scenarios.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Pretty JSON list; decimals are written as strings so no precision is lost.
    pub fn to_json(&self) -> SellerFinanceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SellerFinanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::analyze_deal;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn results() -> ScenarioResults {
        ScenarioResults {
            dscr: Some(dec!(1.25)),
            cap_rate_pct: dec!(5.93),
            coc_return_pct: dec!(2.5),
            total_ltv_pct: dec!(96.67),
            annual_cash_flow: dec!(5000),
        }
    }

    #[test]
    fn test_save_appends_in_order() {
        let mut store = ScenarioStore::new();
        store.save("base", DealSnapshot::default(), results()).unwrap();
        let list = store
            .save("alt", DealSnapshot::default(), results())
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name(), "base");
        assert_eq!(list[1].name(), "alt");
        assert!(list[0].saved_at() <= list[1].saved_at());
    }

    #[test]
    fn test_blank_name_is_rejected_without_change() {
        let mut store = ScenarioStore::new();
        store.save("base", DealSnapshot::default(), results()).unwrap();

        for name in ["", "   ", "\t\n"] {
            let err = store.save(name, DealSnapshot::default(), results());
            match err {
                Err(SellerFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "name"),
                other => panic!("Expected InvalidInput, got {other:?}"),
            }
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut store = ScenarioStore::new();
        store.save("only", DealSnapshot::default(), results()).unwrap();
        assert!(store.delete(1).is_none());
        assert!(store.delete(usize::MAX).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_removes_and_preserves_order() {
        let mut store = ScenarioStore::new();
        for name in ["a", "b", "c"] {
            store.save(name, DealSnapshot::default(), results()).unwrap();
        }
        let removed = store.delete(1).unwrap();
        assert_eq!(removed.name(), "b");
        let names: Vec<&str> = store.list().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_load_returns_exact_snapshot() {
        let mut store = ScenarioStore::new();
        let mut snapshot = DealSnapshot::default();
        snapshot.deal.noi = dec!(401234.56);
        store.save("tweaked", snapshot.clone(), results()).unwrap();

        // Editing the caller's copy must not reach into the store
        snapshot.deal.noi = Decimal::ZERO;

        let loaded = store.load(0).unwrap();
        assert_eq!(loaded.deal.noi, dec!(401234.56));
    }

    #[test]
    fn test_load_missing_index() {
        let store = ScenarioStore::new();
        match store.load(3) {
            Err(SellerFinanceError::ScenarioNotFound { index, len }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 0);
            }
            other => panic!("Expected ScenarioNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_save_analysis_captures_results_subset() {
        let snapshot = DealSnapshot::default();
        let analysis = analyze_deal(&snapshot).result;
        let mut store = ScenarioStore::new();
        store.save_analysis("default", &snapshot, &analysis).unwrap();

        let saved = store.get(0).unwrap();
        assert_eq!(saved.results().dscr, analysis.scorecard.dscr);
        assert_eq!(saved.results().annual_cash_flow, analysis.scorecard.annual_cash_flow);
        assert_eq!(saved.inputs(), &snapshot);
    }

    #[test]
    fn test_json_preserves_store_exactly() {
        let mut store = ScenarioStore::new();
        store.save("one", DealSnapshot::default(), results()).unwrap();
        let mut no_debt = results();
        no_debt.dscr = None;
        store.save("two", DealSnapshot::default(), no_debt).unwrap();

        let json = store.to_json().unwrap();
        assert!(json.contains("\"cap_rate_pct\": \"5.93\""));
        let restored = ScenarioStore::from_json(&json).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = ScenarioStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, SellerFinanceError::SerializationError(_)));
    }
}
