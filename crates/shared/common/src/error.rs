//! Unified error handling.
//!
//! Three kinds of failure reach a caller:
//! - [`AppError::Validation`]: input broke a business rule, storage untouched
//! - [`AppError::NotFound`]: the id is well formed but refers to nothing
//! - [`AppError::Storage`]: the transactional operation failed and was rolled back

use std::error::Error as StdError;

use domain::DomainError;
use thiserror::Error;

/// Boxed driver error kept as the cause of a [`StorageError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by the storage engine.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A unique constraint (the user email) rejected the write
    #[error("duplicate value violates unique constraint: {detail}")]
    Conflict {
        detail: String,
        #[source]
        source: BoxError,
    },

    /// Any other engine failure (connection, commit, query)
    #[error("{0}")]
    Backend(#[source] BoxError),
}

impl StorageError {
    /// Wrap an arbitrary engine error.
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        StorageError::Backend(Box::new(err))
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found with ID: {0}")]
    NotFound(i64),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// True if a unique constraint rejected the write
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Storage {
                source: StorageError::Conflict { .. },
                ..
            }
        )
    }

    /// Add context to a storage failure.
    ///
    /// The new context is prepended to the existing one and the engine error
    /// stays the `source`. Validation and not-found errors are returned
    /// unchanged so callers can keep matching on them.
    pub fn context(self, context: impl Into<String>) -> Self {
        match self {
            AppError::Storage {
                context: inner,
                source,
            } => AppError::Storage {
                context: format!("{}: {}", context.into(), inner),
                source,
            },
            other => other,
        }
    }

    /// Get user-facing message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Invalid input: {}", msg),
            AppError::NotFound(_) => self.to_string(),
            AppError::Storage {
                source: StorageError::Conflict { .. },
                ..
            } => "A user with this email already exists".to_string(),
            AppError::Storage { .. } => {
                tracing::error!("Storage error: {}", self);
                format!("A database error occurred ({})", self)
            }
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Validation(err.to_string())
    }
}

// =============================================================================
// Database Error Conversion (SeaORM)
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => StorageError::Conflict {
                detail,
                source: Box::new(err),
            },
            _ => StorageError::Backend(Box::new(err)),
        }
    }
}

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::storage("Database operation failed", err)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, id: i64) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: i64) -> AppResult<T> {
        self.ok_or(AppError::NotFound(id))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn storage(context: impl Into<String>, source: impl Into<StorageError>) -> Self {
        AppError::Storage {
            context: context.into(),
            source: source.into(),
        }
    }
}
