//! Error taxonomy for the deployment lifecycle.
//!
//! Two tiers: [`ActivationError`] aborts activation of a deployed version,
//! [`RequestError`] is scoped to a single request and leaves the instance live.

use std::path::PathBuf;

use crate::context::IoType;

/// Errors produced while reading or reshaping a tabular dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed dataset: {0}")]
    Shape(String),

    #[error("dataset json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors raised while constructing a deployment instance.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("base directory {} is not a readable directory", path.display())]
    BaseDirectory { path: PathBuf },

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("unsupported context: {0}")]
    UnsupportedContext(String),

    #[error("required environment variable {name} is not set")]
    MissingEnvVar { name: String },

    #[error("required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("storage collaborator unavailable: {0}")]
    Storage(String),
}

/// Per-request errors. The instance that produced one keeps serving.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("expected {expected} input, got {actual}")]
    InputShape { expected: IoType, actual: IoType },

    #[error("deployment produced {actual} output, declared {expected}")]
    OutputShape { expected: IoType, actual: IoType },

    #[error("payload is missing required field: {field}")]
    MissingField { field: String },

    #[error("result is missing declared output field: {field}")]
    MissingOutputField { field: String },

    #[error("invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    /// True when the caller sent something the deployment cannot accept,
    /// as opposed to a failure of the deployment or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RequestError::InputShape { .. }
                | RequestError::MissingField { .. }
                | RequestError::InvalidField { .. }
                | RequestError::Serialization(_)
        )
    }
}
