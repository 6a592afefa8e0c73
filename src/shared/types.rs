use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::validation::FieldErrors;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable summary of the failure
    pub error: String,
    /// Field-level validation messages, present only for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: FieldErrors) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}
