//! Error types shared by the HTTP match store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StoreError;

/// Convenient result alias returning [`HttpStoreError`] failures.
pub type HttpStoreResult<T> = Result<T, HttpStoreError>;

/// Failures that can occur while talking to the match backend over HTTP.
#[derive(Debug, Error)]
pub enum HttpStoreError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Client construction failure.
        #[source]
        source: reqwest::Error,
    },
    /// A configured base URL is not usable.
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Why it cannot be used.
        reason: String,
    },
    /// The request could not be sent or timed out.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        /// Request path.
        path: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("{message}")]
    RequestStatus {
        /// Request path.
        path: String,
        /// Status returned by the backend.
        status: StatusCode,
        /// Backend explanation, or a default message.
        message: String,
    },
    /// Response payload could not be decoded.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        /// Request path.
        path: String,
        /// Decoding failure.
        #[source]
        source: reqwest::Error,
    },
}

impl From<HttpStoreError> for StoreError {
    fn from(err: HttpStoreError) -> Self {
        match err {
            HttpStoreError::RequestStatus { message, .. } => StoreError::rejected(message),
            other => StoreError::unavailable(other.to_string(), other),
        }
    }
}
