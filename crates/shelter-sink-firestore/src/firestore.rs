//! Firestore REST implementation of [`DocumentStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use shelter_gcp_auth::{CredentialConfig, ResolvedCredentials, TokenProvider, resolve};
use tokio::sync::OnceCell;

use crate::document::encode_record;
use crate::error::{Result, SinkError};
use crate::store::{DocumentStore, Write};

/// Firestore REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Database used by Firebase projects.
pub const DEFAULT_DATABASE: &str = "(default)";

const LIST_PAGE_SIZE: &str = "300";

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentName>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

/// Firestore database reached over REST.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    database: String,
    tokens: TokenProvider,
}

impl FirestoreStore {
    /// Store for the resolved project's default database.
    pub fn new(credentials: ResolvedCredentials, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: credentials.project_id,
            database: DEFAULT_DATABASE.to_string(),
            tokens: credentials.tokens,
        }
    }

    /// Overrides the REST endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Targets a named database instead of `(default)`.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Project the store writes to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `projects/{project}/databases/{database}/documents`
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Full resource name of a document.
    pub fn document_name(&self, collection: &str, document_id: &str) -> String {
        format!("{}/{collection}/{document_id}", self.documents_root())
    }

    fn encode_write(&self, write: &Write) -> Result<Value> {
        Ok(match write {
            Write::Create {
                collection,
                document_id,
                record,
            } => json!({
                "update": {
                    "name": self.document_name(collection, document_id),
                    "fields": encode_record(record)?,
                },
                "currentDocument": { "exists": false },
            }),
            Write::Delete { name } => json!({ "delete": name }),
        })
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| SinkError::Http { operation, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SinkError::Http { operation, source })?;

        if !status.is_success() {
            return Err(SinkError::status(operation, status.as_u16(), error_message(&body)));
        }
        Ok(body)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(GoogleErrorBody { error }) if !error.status.is_empty() => {
            format!("{}: {}", error.status, error.message)
        }
        Ok(GoogleErrorBody { error }) => error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_document_names(&self, collection: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/{collection}", self.base_url, self.documents_root());
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .query(&[("pageSize", LIST_PAGE_SIZE), ("mask.fieldPaths", "__name__")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let body = self.send("list", request).await?;
            let page: ListDocumentsResponse = serde_json::from_str(&body)
                .map_err(|source| SinkError::Decode {
                    operation: "list",
                    source,
                })?;

            names.extend(page.documents.into_iter().map(|d| d.name));
            tracing::debug!(collection, listed = names.len(), "Listed document page");

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(names)
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let writes = writes
            .iter()
            .map(|write| self.encode_write(write))
            .collect::<Result<Vec<_>>>()?;
        let count = writes.len();

        let url = format!("{}/{}:commit", self.base_url, self.documents_root());
        let request = self.http.post(url).json(&json!({ "writes": writes }));
        self.send("commit", request).await?;

        tracing::debug!(writes = count, "Committed writes");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("firestore:{}/{}", self.project_id, self.database)
    }
}

/// Lazily resolves credentials and builds a [`FirestoreStore`] once.
///
/// Repeated [`connect`](Self::connect) calls return the same handle.
#[derive(Debug)]
pub struct FirestoreConnector {
    config: CredentialConfig,
    http: reqwest::Client,
    base_url: String,
    store: OnceCell<Arc<FirestoreStore>>,
}

impl FirestoreConnector {
    /// Connector with a default HTTP client.
    pub fn new(config: CredentialConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Connector sharing an existing HTTP client.
    pub fn with_http(config: CredentialConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            store: OnceCell::new(),
        }
    }

    /// Overrides the Firestore REST endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether a store handle has been built.
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Returns the store handle, resolving credentials on first use.
    pub async fn connect(&self) -> Result<Arc<FirestoreStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let credentials = resolve(&self.config, self.http.clone()).await?;
                let credentials_source = credentials.tokens.describe();
                let store = FirestoreStore::new(credentials, self.http.clone())
                    .with_base_url(self.base_url.as_str());
                tracing::info!(
                    project_id = store.project_id(),
                    tokens = credentials_source,
                    "Initialised Firestore client"
                );
                Ok::<_, SinkError>(Arc::new(store))
            })
            .await?;

        Ok(Arc::clone(store))
    }
}
