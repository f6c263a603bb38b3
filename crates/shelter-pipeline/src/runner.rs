//! Pipeline runner.

use std::sync::Arc;

use shelter_adapter_arcgis::ArcGisClient;
use shelter_adapter_fs::{load_local_snapshot, write_local_snapshot};
use shelter_core::{ShelterRecord, filter_records, transform};
use shelter_sink_firestore::{DocumentStore, clear_collection, create_records};

use crate::config::EtlConfig;
use crate::error::Result;
use crate::source::{RecordOrigin, SourceChoice, select_source};

/// Counts from the remote write stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteWrite {
    /// Documents removed by `--clear`
    pub deleted: usize,
    /// Documents created
    pub written: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Where the records came from
    pub origin: RecordOrigin,
    /// Records produced by the source stage
    pub fetched: usize,
    /// Records that passed the validity filter
    pub accepted: usize,
    /// Records dropped by the validity filter
    pub rejected: usize,
    /// Whether the local snapshot was saved
    pub snapshot_written: bool,
    /// Remote write counts
    pub remote: RemoteWrite,
}

/// Runs the import against a document store.
#[derive(Clone)]
pub struct EtlPipeline {
    config: EtlConfig,
    fetcher: ArcGisClient,
    store: Arc<dyn DocumentStore>,
}

impl EtlPipeline {
    /// Creates a pipeline writing to `store`.
    pub fn new(config: EtlConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            fetcher: ArcGisClient::new(),
            store,
        }
    }

    /// Replaces the feature service client.
    pub fn with_fetcher(mut self, fetcher: ArcGisClient) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Runs every stage once.
    pub async fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        tracing::info!(
            collection = %self.config.collection,
            clear = self.config.clear,
            store = %self.store.describe(),
            "Starting ETL run"
        );

        let (origin, records) = self.extract().await?;
        let fetched = records.len();

        let outcome = filter_records(records);
        tracing::info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected_count(),
            "Transformed valid shelters"
        );

        let snapshot_written = self.save_snapshot(&outcome.accepted).await;
        let remote = self.write_remote_store(&outcome.accepted).await?;

        let summary = RunSummary {
            origin,
            fetched,
            accepted: outcome.accepted.len(),
            rejected: outcome.rejected_count(),
            snapshot_written,
            remote,
        };

        tracing::info!(
            origin = %summary.origin,
            written = summary.remote.written,
            deleted = summary.remote.deleted,
            "ETL run completed"
        );
        Ok(summary)
    }

    /// Reads records from the selected source.
    ///
    /// Remote features are transformed; snapshot records are already in
    /// canonical form.
    async fn extract(&self) -> Result<(RecordOrigin, Vec<ShelterRecord>)> {
        match select_source(&self.config) {
            SourceChoice::Remote(url) => {
                let features = self.fetcher.fetch(&url).await?;

                tracing::info!(count = features.len(), "Transforming features");
                let records = features.iter().map(transform).collect();
                Ok((RecordOrigin::Remote(url), records))
            }
            SourceChoice::Local(reason) => {
                let path = &self.config.snapshot_path;
                tracing::warn!(%reason, path = %path.display(), "Using local snapshot");

                let records = load_local_snapshot(path).await?;
                Ok((RecordOrigin::LocalSnapshot(path.clone()), records))
            }
        }
    }

    async fn save_snapshot(&self, records: &[ShelterRecord]) -> bool {
        match write_local_snapshot(records, &self.config.snapshot_path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save local snapshot; continuing");
                false
            }
        }
    }

    /// Clears the collection when configured, then creates one document per record.
    pub async fn write_remote_store(&self, records: &[ShelterRecord]) -> Result<RemoteWrite> {
        let collection = self.config.collection.as_str();
        let store = self.store.as_ref();

        let deleted = if self.config.clear {
            clear_collection(store, collection).await?
        } else {
            0
        };

        let written = create_records(store, collection, records).await?;
        Ok(RemoteWrite { deleted, written })
    }
}

impl std::fmt::Debug for EtlPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtlPipeline")
            .field("config", &self.config)
            .field("store", &self.store.describe())
            .finish_non_exhaustive()
    }
}
