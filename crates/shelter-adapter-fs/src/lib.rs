//! Local snapshot adapter.
//!
//! A snapshot is a pretty-printed JSON array of [`ShelterRecord`]s. The
//! pipeline writes one on every run and can read it back in place of the
//! remote feature service.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use shelter_core::ShelterRecord;

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/winter_shelters.json";

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors raised while reading or writing snapshots.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SnapshotError {
    /// The snapshot file is missing or unreadable.
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        /// Snapshot path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not a JSON array of shelter records.
    #[error("snapshot {path} is not valid JSON: {source}")]
    Parse {
        /// Snapshot path
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot (or its parent directory) could not be written.
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        /// Snapshot path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl SnapshotError {
    /// True when the snapshot simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SnapshotError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Loads a snapshot written by [`write_local_snapshot`].
pub async fn load_local_snapshot(path: &Path) -> Result<Vec<ShelterRecord>> {
    tracing::info!(path = %path.display(), "Loading local snapshot");

    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let records: Vec<ShelterRecord> =
        serde_json::from_str(&data).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(count = records.len(), "Loaded records from local snapshot");
    Ok(records)
}

/// Writes the full record set, replacing any existing snapshot.
///
/// Parent directories are created as needed.
pub async fn write_local_snapshot(records: &[ShelterRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records).map_err(SnapshotError::Serialize)?;

    let write_error = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_error)?;
    }

    tokio::fs::write(path, json).await.map_err(write_error)?;

    tracing::info!(path = %path.display(), count = records.len(), "Saved local snapshot");
    Ok(())
}
