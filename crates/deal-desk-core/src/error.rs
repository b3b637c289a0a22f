use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealDeskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Fee table error: {0}")]
    TableError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DealDeskError {
    fn from(e: serde_json::Error) -> Self {
        DealDeskError::SerializationError(e.to_string())
    }
}
