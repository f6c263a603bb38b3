//! Firestore sink for shelter records.
//!
//! The pipeline talks to a [`DocumentStore`]. [`FirestoreStore`] implements
//! it over the Firestore REST API; [`MemoryStore`] keeps documents in
//! memory for tests. [`create_records`] and [`clear_collection`] split work
//! into commits of at most [`MAX_BATCH_WRITES`] writes.

#![forbid(unsafe_code)]

mod document;
mod error;
mod firestore;
mod memory;
mod store;

pub use document::{AUTO_ID_LENGTH, auto_id, encode_record, encode_value};
pub use error::{Result, SinkError};
pub use firestore::{DEFAULT_BASE_URL, DEFAULT_DATABASE, FirestoreConnector, FirestoreStore};
pub use memory::MemoryStore;
pub use store::{
    DocumentStore, MAX_BATCH_WRITES, PROGRESS_INTERVAL, Write, clear_collection, create_records,
};
