//! Pipeline error type.

use shelter_adapter_arcgis::SourceFetchError;
use shelter_adapter_fs::SnapshotError;
use shelter_sink_firestore::SinkError;
use thiserror::Error;

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A fatal pipeline failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The run configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(#[from] shelter_core::Error),

    /// The feature service could not be read.
    #[error("failed to fetch source data: {0}")]
    Source(#[from] SourceFetchError),

    /// The local snapshot could not be loaded.
    #[error("failed to load local snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The document store rejected a write or could not be reached.
    #[error("failed to write to document store: {0}")]
    Sink(#[from] SinkError),
}

impl PipelineError {
    /// True when the run failed before anything reached the document store.
    ///
    /// Store errors other than authentication may follow committed batches.
    pub fn is_fatal_before_io(&self) -> bool {
        match self {
            PipelineError::Config(_) | PipelineError::Source(_) | PipelineError::Snapshot(_) => {
                true
            }
            PipelineError::Sink(SinkError::Auth(_)) => true,
            PipelineError::Sink(_) => false,
        }
    }
}
