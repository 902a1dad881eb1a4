//! Domain-level errors.
//!
//! These errors represent business rule violations caught on the in-memory
//! record. They are independent of infrastructure concerns.

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Age outside of the accepted range
    #[error("Invalid age: {0}")]
    InvalidAge(i32),
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
