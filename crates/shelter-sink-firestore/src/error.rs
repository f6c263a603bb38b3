//! Sink error types.

use shelter_gcp_auth::CredentialError;
use thiserror::Error;

/// Result type alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors raised by document stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    /// Credentials could not be resolved or exchanged for a token.
    #[error("Firestore authentication failed: {0}")]
    Auth(#[from] CredentialError),

    /// Transport failure.
    #[error("Firestore {operation} request failed: {source}")]
    Http {
        /// Operation in flight (`list`, `commit`)
        operation: &'static str,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The store rejected the request.
    #[error("Firestore {operation} returned HTTP {status}: {message}")]
    Status {
        /// Operation in flight
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Error detail reported by the store
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode Firestore {operation} response: {source}")]
    Decode {
        /// Operation in flight
        operation: &'static str,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded as a document.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl SinkError {
    pub(crate) fn status(operation: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            operation,
            status,
            message: message.into(),
        }
    }
}
