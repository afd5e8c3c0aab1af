//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("This poll has ended")]
    PollClosed,

    #[error("You've already voted in this poll")]
    AlreadyVoted,

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Record not found")]
    NotFound,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Storage operation failed: {0}")]
    Operation(String),

    /// A mutation applied under the store lock refused the change.
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Rejected(inner) => inner,
            other => DomainError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_mutation_surfaces_original_error() {
        let err: DomainError = RepoError::Rejected(DomainError::PollClosed).into();
        assert_eq!(err, DomainError::PollClosed);
    }

    #[test]
    fn storage_failures_are_wrapped() {
        let err: DomainError = RepoError::Operation("lock poisoned".into()).into();
        assert!(matches!(err, DomainError::Storage(msg) if msg.contains("lock poisoned")));
    }
}
