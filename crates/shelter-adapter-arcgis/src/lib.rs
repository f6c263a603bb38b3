//! ArcGIS feature-service source adapter.
//!
//! Fetches a feature collection over HTTP and decides whether a configured
//! source URL is usable at all (placeholder hosts from sample `.env`
//! files are treated as unconfigured).

#![forbid(unsafe_code)]

mod error;
mod fetch;
mod url_check;

pub use error::{Result, SourceFetchError};
pub use fetch::{ArcGisClient, FeatureCollection};
pub use url_check::{SourceUrl, classify_source_url, is_placeholder_host};
