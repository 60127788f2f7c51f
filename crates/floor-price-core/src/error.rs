use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloorPriceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FloorPriceError {
    fn from(e: serde_json::Error) -> Self {
        FloorPriceError::SerializationError(e.to_string())
    }
}

/// Shorthand for an `InvalidInput` on one request field.
pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> FloorPriceError {
    FloorPriceError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
