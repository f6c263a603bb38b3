//! Run configuration.

use std::path::PathBuf;

use shelter_adapter_fs::DEFAULT_SNAPSHOT_PATH;
use shelter_core::Error;

/// Firestore collection written by default.
pub const DEFAULT_COLLECTION: &str = "places";

/// Options for a single import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    /// ArcGIS feature service query URL
    pub source_url: Option<String>,
    /// Load the local snapshot even when the source URL is usable
    pub force_local: bool,
    /// Delete existing documents before writing
    pub clear: bool,
    /// Destination collection
    pub collection: String,
    /// Local snapshot path, read on fallback and written every run
    pub snapshot_path: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            force_local: false,
            clear: false,
            collection: DEFAULT_COLLECTION.to_string(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl EtlConfig {
    /// Sets the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Sets the snapshot path.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Sets the destination collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Enables clearing before writing.
    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Forces the local snapshot source.
    pub fn with_force_local(mut self, force_local: bool) -> Self {
        self.force_local = force_local;
        self
    }

    /// Rejects configurations no run could succeed with.
    ///
    /// The collection must be a single non-empty path segment.
    pub fn validate(&self) -> shelter_core::Result<()> {
        let collection = self.collection.trim();
        if collection.is_empty() {
            return Err(Error::validation_field("collection", "must not be empty"));
        }
        if collection.contains('/') || collection.starts_with("__") {
            return Err(Error::validation_field(
                "collection",
                format!("'{collection}' is not a top-level collection id"),
            ));
        }
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(Error::config("snapshot path must not be empty"));
        }
        Ok(())
    }
}
