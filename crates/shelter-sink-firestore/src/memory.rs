//! In-memory document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use shelter_core::ShelterRecord;
use tokio::sync::Mutex;

use crate::error::{Result, SinkError};
use crate::store::{DocumentStore, MAX_BATCH_WRITES, Write};

/// Document store held in memory, keyed by `collection/id`.
///
/// Commits are validated as a whole before any write is applied, and the
/// commit size limit is enforced, so batching behaves as against Firestore.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<String, ShelterRecord>,
    commits: usize,
    unavailable: bool,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every call fails with HTTP 503.
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(State {
                unavailable: true,
                ..State::default()
            }),
        }
    }

    /// Inserts records directly, bypassing commit accounting.
    pub async fn seed(&self, collection: &str, records: impl IntoIterator<Item = ShelterRecord>) {
        let mut state = self.state.lock().await;
        let offset = state.documents.len();
        for (index, record) in records.into_iter().enumerate() {
            let name = format!("{collection}/seed{:04}", offset + index);
            state.documents.insert(name, record);
        }
    }

    /// Records currently stored in `collection`.
    pub async fn documents(&self, collection: &str) -> Vec<ShelterRecord> {
        let state = self.state.lock().await;
        state
            .documents
            .iter()
            .filter(|(name, _)| in_collection(name, collection))
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Number of successful commits.
    pub async fn commit_count(&self) -> usize {
        self.state.lock().await.commits
    }
}

fn in_collection(name: &str, collection: &str) -> bool {
    name.strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|id| !id.contains('/'))
}

fn unavailable(operation: &'static str) -> SinkError {
    SinkError::status(operation, 503, "UNAVAILABLE: memory store offline")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_document_names(&self, collection: &str) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        if state.unavailable {
            return Err(unavailable("list"));
        }
        Ok(state
            .documents
            .keys()
            .filter(|name| in_collection(name, collection))
            .cloned()
            .collect())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.unavailable {
            return Err(unavailable("commit"));
        }
        if writes.len() > MAX_BATCH_WRITES {
            return Err(SinkError::status(
                "commit",
                400,
                format!("INVALID_ARGUMENT: maximum {MAX_BATCH_WRITES} writes allowed per request"),
            ));
        }

        for write in &writes {
            if let Write::Create {
                collection,
                document_id,
                ..
            } = write
            {
                let name = format!("{collection}/{document_id}");
                if state.documents.contains_key(&name) {
                    return Err(SinkError::status(
                        "commit",
                        409,
                        format!("ALREADY_EXISTS: Document already exists: {name}"),
                    ));
                }
            }
        }

        for write in writes {
            match write {
                Write::Create {
                    collection,
                    document_id,
                    record,
                } => {
                    state
                        .documents
                        .insert(format!("{collection}/{document_id}"), record);
                }
                Write::Delete { name } => {
                    state.documents.remove(&name);
                }
            }
        }
        state.commits += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{clear_collection, create_records};
    use chrono::Utc;

    fn records(count: usize) -> Vec<ShelterRecord> {
        (0..count)
            .map(|i| ShelterRecord::new(format!("Shelter {i}"), Utc::now()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_records_batches_at_limit() {
        let store = MemoryStore::new();

        let saved = create_records(&store, "places", &records(1001)).await.unwrap();

        assert_eq!(saved, 1001);
        assert_eq!(store.commit_count().await, 3);
        assert_eq!(store.documents("places").await.len(), 1001);
    }

    #[tokio::test]
    async fn test_create_no_records_commits_nothing() {
        let store = MemoryStore::new();
        assert_eq!(create_records(&store, "places", &[]).await.unwrap(), 0);
        assert_eq!(store.commit_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear_empty_collection_is_noop() {
        let store = MemoryStore::new();
        assert_eq!(clear_collection(&store, "places").await.unwrap(), 0);
        assert_eq!(store.commit_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear_only_touches_named_collection() {
        let store = MemoryStore::new();
        store.seed("places", records(3)).await;
        store.seed("archive", records(2)).await;

        assert_eq!(clear_collection(&store, "places").await.unwrap(), 3);
        assert!(store.documents("places").await.is_empty());
        assert_eq!(store.documents("archive").await.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_commit_rejected() {
        let store = MemoryStore::new();
        let writes = (0..MAX_BATCH_WRITES + 1)
            .map(|i| Write::Delete {
                name: format!("places/{i}"),
            })
            .collect();

        let err = store.commit(writes).await.unwrap_err();
        assert!(matches!(err, SinkError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejects_whole_commit() {
        let store = MemoryStore::new();
        store.seed("places", records(1)).await;
        let record = ShelterRecord::new("Dup", Utc::now());

        let writes = vec![
            Write::Create {
                collection: "places".into(),
                document_id: "fresh".into(),
                record: record.clone(),
            },
            Write::Create {
                collection: "places".into(),
                document_id: "seed0000".into(),
                record,
            },
        ];

        let err = store.commit(writes).await.unwrap_err();
        assert!(matches!(err, SinkError::Status { status: 409, .. }));
        assert_eq!(store.documents("places").await.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::unavailable();
        assert!(store.list_document_names("places").await.is_err());
        assert!(create_records(&store, "places", &records(1)).await.is_err());
    }
}
