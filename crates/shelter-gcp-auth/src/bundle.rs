//! Credential bundle parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CredentialError, Result};

/// Google's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// A parsed Google credential JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialBundle {
    /// `"type": "service_account"` (also assumed when `type` is absent)
    ServiceAccount(ServiceAccountKey),
    /// `"type": "authorized_user"`, as written by `gcloud auth application-default login`
    AuthorizedUser(AuthorizedUserCredentials),
}

/// Service-account key material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    /// Project the account belongs to
    #[serde(default)]
    pub project_id: Option<String>,
    /// Key id, sent as the JWT `kid`
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// PEM-encoded RSA private key
    pub private_key: String,
    /// Service account email, the JWT issuer
    pub client_email: String,
    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Refresh-token credentials for an end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUserCredentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Project billed for quota, used as a project id fallback
    #[serde(default)]
    pub quota_project_id: Option<String>,
    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Assembles a key from discrete configuration values.
    ///
    /// Private keys stored in `.env` files usually carry literal `\n`
    /// sequences; those are turned back into newlines.
    pub fn from_parts(project_id: &str, client_email: &str, private_key: &str) -> Self {
        Self {
            project_id: Some(project_id.to_string()),
            private_key_id: None,
            private_key: private_key.replace("\\n", "\n"),
            client_email: client_email.to_string(),
            token_uri: default_token_uri(),
        }
    }
}

impl CredentialBundle {
    /// Parses a credential JSON document. `origin` names its source in errors.
    pub fn from_json(json: &str, origin: &str) -> Result<Self> {
        let invalid = |source| CredentialError::InvalidJson {
            origin: origin.to_string(),
            source,
        };

        let value: Value = serde_json::from_str(json).map_err(invalid)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        match kind.as_deref() {
            None | Some("service_account") => {
                let mut key: ServiceAccountKey = serde_json::from_value(value).map_err(invalid)?;
                key.private_key = key.private_key.replace("\\n", "\n");
                Ok(Self::ServiceAccount(key))
            }
            Some("authorized_user") => serde_json::from_value(value)
                .map(Self::AuthorizedUser)
                .map_err(invalid),
            Some(other) => Err(CredentialError::UnsupportedType(other.to_string())),
        }
    }

    /// Reads and parses a credential JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CredentialError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json, &path.display().to_string())
    }

    /// The project id embedded in the bundle, if any.
    pub fn project_id(&self) -> Option<&str> {
        let project_id = match self {
            Self::ServiceAccount(key) => key.project_id.as_deref(),
            Self::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        };
        project_id.filter(|id| !id.trim().is_empty())
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
        }
    }
}
