//! OAuth2 access tokens.
//!
//! A [`TokenSource`] knows how to obtain a fresh token for one kind of
//! credential. [`TokenProvider`] wraps a source with a cache so callers
//! can ask for a token before every request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::bundle::{AuthorizedUserCredentials, ServiceAccountKey};
use crate::error::{CredentialError, Result};

/// OAuth2 scope for Cloud Firestore / Datastore.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed JWT assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens closer than this to expiry are refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// A bearer token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Bearer token value
    pub token: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// True if the token is usable at `now` with the refresh margin applied.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Token endpoint / metadata server response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

async fn read_token_response(response: reqwest::Response, endpoint: &str) -> Result<AccessToken> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CredentialError::TokenRequest(format!(
            "{endpoint} returned HTTP {status}: {body}"
        )));
    }

    let parsed: TokenResponse = response.json().await.map_err(|e| {
        CredentialError::TokenRequest(format!("{endpoint} response parse failed: {e}"))
    })?;

    Ok(AccessToken {
        token: parsed.access_token,
        expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
    })
}

/// Something that can mint a fresh access token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Request a new token.
    async fn fetch(&self) -> Result<AccessToken>;

    /// Short label for logs.
    fn describe(&self) -> &'static str;
}

/// JWT-bearer grant for a service account.
pub struct ServiceAccountTokenSource {
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    scope: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountTokenSource {
    /// Builds a source from a key, validating the PEM up front.
    pub fn new(key: &ServiceAccountKey, http: reqwest::Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;

        Ok(Self {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            encoding_key,
            scope: DATASTORE_SCOPE.to_string(),
            http,
        })
    }

    /// Signs the assertion sent to the token endpoint.
    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn fetch(&self) -> Result<AccessToken> {
        let assertion = self.signed_assertion(Utc::now())?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CredentialError::TokenRequest(format!("{}: {e}", self.token_uri)))?;

        read_token_response(response, &self.token_uri).await
    }

    fn describe(&self) -> &'static str {
        "service_account"
    }
}

/// Refresh-token grant for `gcloud` user credentials.
pub struct AuthorizedUserTokenSource {
    credentials: AuthorizedUserCredentials,
    http: reqwest::Client,
}

impl AuthorizedUserTokenSource {
    /// Creates a source for the given user credentials.
    pub fn new(credentials: AuthorizedUserCredentials, http: reqwest::Client) -> Self {
        Self { credentials, http }
    }
}

#[async_trait]
impl TokenSource for AuthorizedUserTokenSource {
    async fn fetch(&self) -> Result<AccessToken> {
        let creds = &self.credentials;
        let response = self
            .http
            .post(&creds.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CredentialError::TokenRequest(format!("{}: {e}", creds.token_uri)))?;

        read_token_response(response, &creds.token_uri).await
    }

    fn describe(&self) -> &'static str {
        "authorized_user"
    }
}

/// Tokens from the GCE / Cloud Run metadata server.
pub struct MetadataTokenSource {
    base_url: String,
    http: reqwest::Client,
}

impl MetadataTokenSource {
    /// Creates a source against the metadata server at `base_url`.
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Asks the metadata server which project this workload runs in.
    ///
    /// Doubles as the availability check for ambient credentials.
    pub async fn project_id(&self) -> Result<String> {
        let url = format!("{}/computeMetadata/v1/project/project-id", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                CredentialError::NotConfigured(format!("metadata server unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(CredentialError::NotConfigured(format!(
                "metadata server returned HTTP {}",
                response.status()
            )));
        }

        let project = response
            .text()
            .await
            .map_err(|e| CredentialError::NotConfigured(e.to_string()))?;
        Ok(project.trim().to_string())
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn fetch(&self) -> Result<AccessToken> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.base_url
        );
        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| CredentialError::TokenRequest(format!("{url}: {e}")))?;

        read_token_response(response, &url).await
    }

    fn describe(&self) -> &'static str {
        "metadata"
    }
}

/// A fixed token, for emulators and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Creates a source that always returns `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_at: Utc::now() + Duration::days(365),
        })
    }

    fn describe(&self) -> &'static str {
        "static"
    }
}

/// Caching wrapper around a [`TokenSource`].
#[derive(Clone)]
pub struct TokenProvider {
    source: Arc<dyn TokenSource>,
    cached: Arc<Mutex<Option<AccessToken>>>,
}

impl TokenProvider {
    /// Wraps a token source.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Provider returning a fixed token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::new(Arc::new(StaticTokenSource::new(token)))
    }

    /// Label of the underlying source.
    pub fn describe(&self) -> &'static str {
        self.source.describe()
    }

    /// Returns a usable bearer token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.token.clone());
        }

        let token = self.source.fetch().await?;
        tracing::debug!(
            source = self.source.describe(),
            expires_at = %token.expires_at,
            "Fetched access token"
        );

        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("source", &self.source.describe())
            .finish_non_exhaustive()
    }
}
