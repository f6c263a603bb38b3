#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! ShelterLink Core Library
//!
//! Data model, feature transformer, and validity filter for the ShelterLink
//! import pipeline. Everything in this crate is pure; I/O lives in the
//! adapter and sink crates.

pub mod error;
pub mod filter;
pub mod keywords;
pub mod transform;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result};
pub use filter::{FilterOutcome, filter_records, is_valid};
pub use transform::{transform, transform_at};
pub use types::{
    DEFAULT_POPULATION, Geometry, Location, RawFeature, SOURCE_TAG, ShelterRecord, UNKNOWN_ADDRESS,
    UNKNOWN_SHELTER,
};
