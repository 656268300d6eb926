//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of a single value or record
/// (validation, conflicting reference data). Batch-level conditions such as a
/// stock shortfall are not errors; they are reported as diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required field was absent or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// An identifier was invalid (e.g. blank code).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Reference data contradicts itself (e.g. duplicate SKU in a catalog).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
