use thiserror::Error;

/// Failures raised before or during a computation. Guards and fallbacks
/// are reported as warnings instead.
#[derive(Debug, Error)]
pub enum CapitalAdvisorError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CapitalAdvisorError {
    fn from(e: serde_json::Error) -> Self {
        CapitalAdvisorError::SerializationError(e.to_string())
    }
}
