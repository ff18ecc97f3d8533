use thiserror::Error;

/// Errors surfaced by passport operations.
///
/// Every variant is reported to the immediate caller; nothing here is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("record {0} not found")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("record {record_id} cannot change status: {reason}")]
    InvalidTransition { record_id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record store error: {0}")]
    Store(String),

    #[error("identity provider error: {0}")]
    Identity(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(
        "transformation into {output_id} aborted after committing inputs {committed_inputs:?}: {reason}"
    )]
    TransformationAborted {
        output_id: String,
        committed_inputs: Vec<String>,
        reason: String,
    },
}

impl DppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn already_exists(record_id: &str) -> Self {
        Self::Validation(format!("record {} already exists", record_id))
    }

    pub fn invalid_transition(record_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            record_id: record_id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
