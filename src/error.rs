use crate::domain::order::OrderError;
use crate::messaging::PublishError;
use crate::store::RepositoryError;
use crate::validation::{ValidationError, ValidationIssue};

/// Error taxonomy shared by both use cases and the HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Domain invariant violated: {0}")]
    Domain(#[from] OrderError),

    /// Broker or storage could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Bytes that are not JSON at all.
    #[error("Malformed JSON: {0}")]
    Decode(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl PipelineError {
    /// Field-level detail for 400-class responses.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        match self {
            PipelineError::Validation(e) => e.issues.clone(),
            PipelineError::Domain(e) => vec![ValidationIssue::from(e)],
            PipelineError::Decode(_) => {
                vec![ValidationIssue::new("", self.to_string(), "invalid_json")]
            }
            _ => Vec::new(),
        }
    }
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateId(_) => PipelineError::Conflict(err.to_string()),
            RepositoryError::Unavailable(_) | RepositoryError::Corrupt { .. } => {
                PipelineError::Unavailable(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Decode(err.to_string())
    }
}

impl From<PublishError> for PipelineError {
    fn from(err: PublishError) -> Self {
        PipelineError::Unavailable(err.to_string())
    }
}
