//! Feature-service HTTP client.

use serde_json::Value;
use shelter_core::RawFeature;

use crate::error::{Result, SourceFetchError};

/// A decoded feature-service query response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    /// Decoded features, in response order
    pub features: Vec<RawFeature>,
    /// Entries in `features` that could not be decoded and were skipped
    pub skipped: usize,
    /// The service truncated the result set (`exceededTransferLimit`)
    pub truncated: bool,
}

impl FeatureCollection {
    /// Parses a response body.
    pub fn from_json(url: &str, body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|source| SourceFetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        let Some(entries) = value.get("features").and_then(Value::as_array) else {
            return Err(SourceFetchError::MissingFeatures {
                url: url.to_string(),
                message: describe_missing(&value),
            });
        };

        let mut features = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for (index, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<RawFeature>(entry.clone()) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(index, error = %e, "Skipping undecodable feature");
                }
            }
        }

        let truncated = value
            .get("exceededTransferLimit")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            features,
            skipped,
            truncated,
        })
    }
}

/// Explains what a body without `features` contained instead.
///
/// ArcGIS reports query errors with HTTP 200 and an `error` object.
fn describe_missing(value: &Value) -> String {
    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(Value::as_i64);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return match code {
            Some(code) => format!("service error {code}: {message}"),
            None => format!("service error: {message}"),
        };
    }

    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("response has no 'features' array (keys: {})", keys.join(", "))
        }
        _ => "response is not a JSON object".to_string(),
    }
}

/// Client for ArcGIS feature-service queries.
#[derive(Debug, Clone, Default)]
pub struct ArcGisClient {
    http: reqwest::Client,
}

impl ArcGisClient {
    /// Creates a client with its own HTTP connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client sharing an existing HTTP client.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetches every feature from `url`.
    pub async fn fetch(&self, url: &str) -> Result<Vec<RawFeature>> {
        Ok(self.fetch_collection(url).await?.features)
    }

    /// Fetches the full collection, including skip and truncation info.
    pub async fn fetch_collection(&self, url: &str) -> Result<FeatureCollection> {
        tracing::info!(url = %url, "Fetching features");

        let http_error = |source| SourceFetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_error)?;
        let collection = FeatureCollection::from_json(url, &body)?;

        if collection.truncated {
            tracing::warn!(
                url = %url,
                count = collection.features.len(),
                "Service truncated the result set; only the first page was imported"
            );
        }

        tracing::info!(
            count = collection.features.len(),
            skipped = collection.skipped,
            "Found features"
        );
        Ok(collection)
    }
}
