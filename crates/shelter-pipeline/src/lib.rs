//! ShelterLink import pipeline.
//!
//! One run moves shelter data through five stages, in order:
//!
//! 1. pick the source ([`select_source`]): the ArcGIS feature service, or
//!    the local snapshot when the service URL is unusable or `--local` is set
//! 2. transform raw features into [`ShelterRecord`](shelter_core::ShelterRecord)s
//! 3. drop invalid records
//! 4. save the local snapshot (failures only warn)
//! 5. optionally clear the collection, then write every record
//!
//! [`EtlPipeline`] drives the stages against an injected
//! [`DocumentStore`](shelter_sink_firestore::DocumentStore).

#![forbid(unsafe_code)]

mod config;
mod error;
mod runner;
mod source;

pub use config::{DEFAULT_COLLECTION, EtlConfig};
pub use error::{PipelineError, Result};
pub use runner::{EtlPipeline, RemoteWrite, RunSummary};
pub use source::{LocalReason, RecordOrigin, SourceChoice, select_source};
