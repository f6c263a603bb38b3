//! Credential source resolution.
//!
//! Sources are tried in a fixed order and the first one that is
//! configured wins:
//!
//! 1. Inline service-account JSON
//! 2. Path to a service-account JSON file
//! 3. Discrete project id / client email / private key values
//! 4. Application Default Credentials: `GOOGLE_APPLICATION_CREDENTIALS`,
//!    then the gcloud well-known file, then the metadata server
//!
//! A configured source that turns out to be broken is an error; resolution
//! never silently falls through to the next source.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bundle::{CredentialBundle, ServiceAccountKey};
use crate::error::{CredentialError, Result};
use crate::token::{
    AuthorizedUserTokenSource, MetadataTokenSource, ServiceAccountTokenSource, TokenProvider,
    TokenSource,
};

/// Default GCE metadata server.
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";

/// Everything the resolver may look at.
///
/// Built by the caller (usually from CLI flags with environment
/// fallbacks); the resolver itself never reads the process environment.
#[derive(Clone, Default)]
pub struct CredentialConfig {
    /// `FIREBASE_SERVICE_ACCOUNT_JSON`
    pub service_account_json: Option<String>,
    /// `FIREBASE_SERVICE_ACCOUNT_PATH`
    pub service_account_path: Option<PathBuf>,
    /// `FIREBASE_PROJECT_ID`
    pub project_id: Option<String>,
    /// `FIREBASE_CLIENT_EMAIL`
    pub client_email: Option<String>,
    /// `FIREBASE_PRIVATE_KEY`
    pub private_key: Option<String>,
    /// `GOOGLE_APPLICATION_CREDENTIALS`
    pub application_credentials: Option<PathBuf>,
    /// `GOOGLE_CLOUD_PROJECT` / `GCLOUD_PROJECT`
    pub ambient_project_id: Option<String>,
    /// gcloud ADC file; defaults to the platform location when `None`
    pub well_known_file: Option<PathBuf>,
    /// Metadata server base URL; defaults to [`DEFAULT_METADATA_URL`]
    pub metadata_url: Option<String>,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("CredentialConfig")
            .field("service_account_json", &redacted(&self.service_account_json))
            .field("service_account_path", &self.service_account_path)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &redacted(&self.private_key))
            .field("application_credentials", &self.application_credentials)
            .field("ambient_project_id", &self.ambient_project_id)
            .field("well_known_file", &self.well_known_file)
            .field("metadata_url", &self.metadata_url)
            .finish()
    }
}

impl CredentialConfig {
    fn well_known_path(&self) -> Option<PathBuf> {
        self.well_known_file.clone().or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join("gcloud").join("application_default_credentials.json"))
        })
    }

    fn metadata_base(&self) -> &str {
        self.metadata_url.as_deref().unwrap_or(DEFAULT_METADATA_URL)
    }
}

/// Which configured source produced the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Inline JSON value
    InlineJson,
    /// JSON file at the given path
    File(PathBuf),
    /// Discrete project id / email / key values
    DiscreteValues,
    /// `GOOGLE_APPLICATION_CREDENTIALS` file
    ApplicationCredentialsFile(PathBuf),
    /// gcloud well-known ADC file
    WellKnownFile(PathBuf),
    /// Metadata server
    MetadataServer,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InlineJson => write!(f, "inline service account JSON"),
            Self::File(path) => write!(f, "service account file {}", path.display()),
            Self::DiscreteValues => write!(f, "discrete service account values"),
            Self::ApplicationCredentialsFile(path) => {
                write!(f, "GOOGLE_APPLICATION_CREDENTIALS ({})", path.display())
            }
            Self::WellKnownFile(path) => write!(f, "gcloud ADC file {}", path.display()),
            Self::MetadataServer => write!(f, "metadata server"),
        }
    }
}

/// Resolved credentials: a project and a way to get tokens for it.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// Project that owns the Firestore database
    pub project_id: String,
    /// Where the credentials came from
    pub source: CredentialSource,
    /// Cached token provider
    pub tokens: TokenProvider,
}

/// Resolves credentials from the first configured source.
///
/// Every failure carries the remediation options in its message.
pub async fn resolve(
    config: &CredentialConfig,
    http: reqwest::Client,
) -> Result<ResolvedCredentials> {
    let resolved = resolve_inner(config, http)
        .await
        .map_err(CredentialError::with_remediation)?;

    tracing::info!(
        source = %resolved.source,
        project_id = %resolved.project_id,
        "Resolved Firestore credentials"
    );
    Ok(resolved)
}

async fn resolve_inner(
    config: &CredentialConfig,
    http: reqwest::Client,
) -> Result<ResolvedCredentials> {
    if let Some(json) = non_blank(config.service_account_json.as_deref()) {
        let bundle = CredentialBundle::from_json(json, "FIREBASE_SERVICE_ACCOUNT_JSON")?;
        return from_bundle(bundle, CredentialSource::InlineJson, None, http);
    }

    if let Some(path) = non_blank_path(config.service_account_path.as_deref()) {
        let bundle = CredentialBundle::from_file(path)?;
        return from_bundle(bundle, CredentialSource::File(path.to_path_buf()), None, http);
    }

    if let Some(key) = discrete_key(config)? {
        return from_bundle(
            CredentialBundle::ServiceAccount(key),
            CredentialSource::DiscreteValues,
            None,
            http,
        );
    }

    let ambient_project = non_blank(config.ambient_project_id.as_deref());

    if let Some(path) = non_blank_path(config.application_credentials.as_deref()) {
        let bundle = CredentialBundle::from_file(path)?;
        let source = CredentialSource::ApplicationCredentialsFile(path.to_path_buf());
        return from_bundle(bundle, source, ambient_project, http);
    }

    if let Some(path) = config.well_known_path().filter(|p| p.is_file()) {
        let bundle = CredentialBundle::from_file(&path)?;
        return from_bundle(bundle, CredentialSource::WellKnownFile(path), ambient_project, http);
    }

    tracing::debug!(
        url = config.metadata_base(),
        "Checking metadata server for ambient credentials"
    );
    let metadata = MetadataTokenSource::new(config.metadata_base(), http);
    let metadata_project = metadata.project_id().await?;
    let project_id = ambient_project
        .map(str::to_string)
        .or_else(|| Some(metadata_project).filter(|p| !p.is_empty()))
        .ok_or_else(|| CredentialError::MissingProjectId("metadata server".to_string()))?;

    Ok(ResolvedCredentials {
        project_id,
        source: CredentialSource::MetadataServer,
        tokens: TokenProvider::new(Arc::new(metadata)),
    })
}

/// Assembles a key from the discrete values.
///
/// `Ok(None)` when none of the three are set; an error when only some are.
fn discrete_key(config: &CredentialConfig) -> Result<Option<ServiceAccountKey>> {
    let parts = [
        ("FIREBASE_PROJECT_ID", non_blank(config.project_id.as_deref())),
        ("FIREBASE_CLIENT_EMAIL", non_blank(config.client_email.as_deref())),
        ("FIREBASE_PRIVATE_KEY", non_blank(config.private_key.as_deref())),
    ];

    match parts {
        [(_, Some(project)), (_, Some(email)), (_, Some(key))] => {
            Ok(Some(ServiceAccountKey::from_parts(project, email, key)))
        }
        [(_, None), (_, None), (_, None)] => Ok(None),
        _ => {
            let missing: Vec<&str> = parts
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(CredentialError::MissingField(missing.join(", ")))
        }
    }
}

fn from_bundle(
    bundle: CredentialBundle,
    source: CredentialSource,
    project_override: Option<&str>,
    http: reqwest::Client,
) -> Result<ResolvedCredentials> {
    let project_id = project_override
        .or_else(|| bundle.project_id())
        .map(str::to_string)
        .ok_or_else(|| CredentialError::MissingProjectId(bundle.kind().to_string()))?;

    let token_source: Arc<dyn TokenSource> = match bundle {
        CredentialBundle::ServiceAccount(key) => {
            Arc::new(ServiceAccountTokenSource::new(&key, http)?)
        }
        CredentialBundle::AuthorizedUser(user) => {
            Arc::new(AuthorizedUserTokenSource::new(user, http))
        }
    };

    Ok(ResolvedCredentials {
        project_id,
        source,
        tokens: TokenProvider::new(token_source),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_blank_path(value: Option<&Path>) -> Option<&Path> {
    value.filter(|p| !p.as_os_str().is_empty())
}
