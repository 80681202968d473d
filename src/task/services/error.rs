//! Service-level error composition.

use crate::task::{domain::TaskDomainError, ports::RepositoryError};
use thiserror::Error;

/// Errors returned by task and subtask orchestration services.
///
/// Validation failures are deterministic and never retried; storage
/// failures pass through unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
