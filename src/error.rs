use thiserror::Error;

use crate::dao::storage::StoreError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backend failed or refused the request.
    #[error("{0}")]
    Unavailable(#[source] StoreError),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Unavailable(err)
    }
}
