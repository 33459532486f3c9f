//! Engine error taxonomy.

use thiserror::Error;

use annostack_auth::AuthzError;
use annostack_core::DomainError;

use crate::store::StoreError;

/// Failure of an execute, undo or redo call.
///
/// "Nothing to undo/redo" is not an error; see
/// [`UndoRedoOutcome::Nothing`](crate::undo::UndoRedoOutcome::Nothing).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Lost an optimistic version check. Never retried by the engine.
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("unknown domain class '{0}'")]
    UnknownDomainClass(String),

    #[error("storage failure: {0}")]
    Store(String),
}

impl EngineError {
    /// HTTP-style status of the failure.
    pub fn status(&self) -> u16 {
        match self {
            EngineError::Validation(_) => 400,
            EngineError::NotFound(_) => 404,
            EngineError::AlreadyExists(_) | EngineError::ConcurrentModification(_) => 409,
            EngineError::Permission(_) => 403,
            EngineError::UnknownDomainClass(_) | EngineError::Store(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::NotFound(_) => "not_found",
            EngineError::AlreadyExists(_) => "already_exists",
            EngineError::ConcurrentModification(_) => "concurrent_modification",
            EngineError::Permission(_) => "forbidden",
            EngineError::UnknownDomainClass(_) => "unknown_domain_class",
            EngineError::Store(_) => "storage_error",
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => EngineError::Validation(msg),
            DomainError::NotFound(what) => EngineError::NotFound(what),
            DomainError::AlreadyExists(msg) => EngineError::AlreadyExists(msg),
            DomainError::Conflict(msg) => EngineError::ConcurrentModification(msg),
            DomainError::Forbidden(msg) => EngineError::Permission(msg),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => EngineError::ConcurrentModification(msg),
            StoreError::AlreadyExists(msg) => EngineError::AlreadyExists(msg),
            StoreError::NotFound(what) => EngineError::NotFound(what),
            other @ (StoreError::Backend(_) | StoreError::Serialization(_)) => {
                EngineError::Store(other.to_string())
            }
        }
    }
}

impl From<AuthzError> for EngineError {
    fn from(value: AuthzError) -> Self {
        EngineError::Permission(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(EngineError::from(DomainError::validation("x")).status(), 400);
        assert_eq!(EngineError::from(DomainError::not_found("Term 1")).status(), 404);
        assert_eq!(EngineError::from(StoreError::AlreadyExists("k".into())).status(), 409);
        assert_eq!(EngineError::from(StoreError::Concurrency("v".into())).status(), 409);
        assert_eq!(EngineError::UnknownDomainClass("x".into()).status(), 500);
        assert_eq!(EngineError::from(StoreError::Backend("down".into())).status(), 500);
    }

    #[test]
    fn stale_versions_become_concurrent_modification() {
        let err = EngineError::from(DomainError::conflict("stale"));
        assert_eq!(err, EngineError::ConcurrentModification("stale".into()));
        assert_eq!(err.code(), "concurrent_modification");
    }
}
