//! Source fetch error types.

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceFetchError>;

/// Errors raised while fetching features from the feature service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceFetchError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {source}")]
    Http {
        /// Source URL
        url: String,
        /// Transport error
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Source URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The body was JSON but had no `features` array.
    #[error("no features found in response from {url}: {message}")]
    MissingFeatures {
        /// Source URL
        url: String,
        /// What was found instead
        message: String,
    },

    /// The body was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        /// Source URL
        url: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },
}

impl SourceFetchError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceFetchError::Status { status, .. } => Some(*status),
            SourceFetchError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
