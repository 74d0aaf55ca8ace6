use thiserror::Error;

#[derive(Debug, Error)]
pub enum SellerFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Scenario not found: index {index} (store holds {len})")]
    ScenarioNotFound { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SellerFinanceError {
    fn from(e: serde_json::Error) -> Self {
        SellerFinanceError::SerializationError(e.to_string())
    }
}
