use std::error::Error;
use thiserror::Error;

/// Result alias for match store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by match store backends regardless of the transport.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or answered garbage.
    #[error("{message}")]
    Unavailable {
        /// Message shown to the user.
        message: String,
        /// Underlying transport or decoding failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered but refused the request.
    #[error("{message}")]
    Rejected {
        /// Backend explanation, or a default message.
        message: String,
    },
}

impl StoreError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StoreError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Construct a rejection carrying the backend's own explanation.
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            message: message.into(),
        }
    }
}
