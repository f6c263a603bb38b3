//! Credential error types.

/// Manual remediation options, appended to resolution failures.
pub const REMEDIATION: &str = "Configure Firestore credentials using one of:
  1. FIREBASE_SERVICE_ACCOUNT_JSON: the full service account JSON inline
  2. FIREBASE_SERVICE_ACCOUNT_PATH: path to a service account JSON file
  3. FIREBASE_PROJECT_ID, FIREBASE_CLIENT_EMAIL and FIREBASE_PRIVATE_KEY";

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors raised while resolving credentials or fetching access tokens.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// A credential bundle was not valid JSON or lacked required fields.
    #[error("invalid credential JSON from {origin}: {source}")]
    InvalidJson {
        /// Where the JSON came from
        origin: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A credential file could not be read.
    #[error("failed to read credential file {path}: {source}")]
    ReadFile {
        /// File path
        path: String,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// A discrete credential value was missing.
    #[error("missing credential value: {0}")]
    MissingField(String),

    /// The bundle's `type` is not one we can exchange for tokens.
    #[error("unsupported credential type '{0}'")]
    UnsupportedType(String),

    /// The private key is not a valid RSA PEM.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// No project id could be determined for the resolved credentials.
    #[error("no project id available for {0} credentials")]
    MissingProjectId(String),

    /// No credential source is configured and no ambient credentials exist.
    #[error("no credentials found: {0}")]
    NotConfigured(String),

    /// Token endpoint or metadata server request failed.
    #[error("token request failed: {0}")]
    TokenRequest(String),

    /// Resolution failed; carries the remediation text.
    #[error("{source}\n\n{remediation}")]
    Resolution {
        /// Underlying failure
        #[source]
        source: Box<CredentialError>,
        /// Remediation options shown to the operator
        remediation: &'static str,
    },
}

impl CredentialError {
    /// Wraps an error with the remediation options.
    ///
    /// Already-wrapped errors are returned unchanged.
    pub fn with_remediation(self) -> Self {
        match self {
            wrapped @ CredentialError::Resolution { .. } => wrapped,
            other => CredentialError::Resolution {
                source: Box::new(other),
                remediation: REMEDIATION,
            },
        }
    }
}
