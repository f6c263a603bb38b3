//! Document store abstraction and batched writes.

use async_trait::async_trait;
use shelter_core::ShelterRecord;

use crate::document::auto_id;
use crate::error::Result;

/// Maximum writes in one commit.
pub const MAX_BATCH_WRITES: usize = 500;

/// Records between progress log lines.
pub const PROGRESS_INTERVAL: usize = 100;

/// A single write inside a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create a new document; fails if the id is already taken.
    Create {
        /// Target collection
        collection: String,
        /// Document id within the collection
        document_id: String,
        /// Document contents
        record: ShelterRecord,
    },
    /// Delete a document by the name the store listed it under.
    Delete {
        /// Document name
        name: String,
    },
}

/// A document database that accepts atomic batches of writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of every document in `collection`.
    async fn list_document_names(&self, collection: &str) -> Result<Vec<String>>;

    /// Applies all writes atomically.
    async fn commit(&self, writes: Vec<Write>) -> Result<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Deletes every document in `collection`, returning how many were removed.
///
/// An empty collection costs one listing and no commit.
pub async fn clear_collection(store: &dyn DocumentStore, collection: &str) -> Result<usize> {
    tracing::info!(collection, store = %store.describe(), "Clearing existing documents");

    let names = store.list_document_names(collection).await?;
    if names.is_empty() {
        tracing::info!(collection, "Collection already empty");
        return Ok(0);
    }

    for chunk in names.chunks(MAX_BATCH_WRITES) {
        let writes = chunk
            .iter()
            .map(|name| Write::Delete { name: name.clone() })
            .collect();
        store.commit(writes).await?;
    }

    tracing::info!(collection, deleted = names.len(), "Cleared existing documents");
    Ok(names.len())
}

/// Creates one document per record under a fresh auto-ID.
///
/// Each commit is atomic; a failure leaves earlier commits in place.
pub async fn create_records(
    store: &dyn DocumentStore,
    collection: &str,
    records: &[ShelterRecord],
) -> Result<usize> {
    tracing::info!(
        collection,
        count = records.len(),
        store = %store.describe(),
        "Preparing to save records"
    );

    let mut processed = 0;
    for chunk in records.chunks(MAX_BATCH_WRITES) {
        let mut writes = Vec::with_capacity(chunk.len());
        for record in chunk {
            writes.push(Write::Create {
                collection: collection.to_string(),
                document_id: auto_id(),
                record: record.clone(),
            });

            processed += 1;
            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(processed, total = records.len(), "Processed records");
            }
        }
        store.commit(writes).await?;
        tracing::debug!(committed = processed, "Committed batch");
    }

    tracing::info!(collection, saved = records.len(), "Saved records");
    Ok(records.len())
}
