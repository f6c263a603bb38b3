//! Canonical shelter record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel name for features without a usable name attribute.
pub const UNKNOWN_SHELTER: &str = "Unknown Shelter";

/// Sentinel address for features without an address attribute.
pub const UNKNOWN_ADDRESS: &str = "Address not available";

/// Provenance tag stamped on every imported record.
pub const SOURCE_TAG: &str = "arcgis_import";

/// Population tag assigned when the source carries no population data.
pub const DEFAULT_POPULATION: &str = "MIXED";

/// A shelter in the shape the rest of the product reads.
///
/// Records carry no identifier: the destination store assigns one when
/// the document is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    /// Display name, or [`UNKNOWN_SHELTER`]
    pub name: String,

    /// Street address, or [`UNKNOWN_ADDRESS`]
    pub address: String,

    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Free-form shelter category
    #[serde(rename = "type")]
    pub shelter_type: String,

    /// Free-form operating status
    pub status: String,

    /// Point location; absent unless both source coordinates were present
    #[serde(default)]
    pub location: Option<Location>,

    /// Opening hours as published by the source
    #[serde(default)]
    pub hours_text: Option<String>,

    /// Intake notes and restrictions
    #[serde(default)]
    pub notes: Option<String>,

    /// Services offered
    #[serde(default)]
    pub services: Vec<String>,

    /// Population tags served
    #[serde(default)]
    pub populations: BTreeSet<String>,

    /// Wheelchair / ADA accessible
    pub ada: bool,

    /// Pets allowed
    pub pets_ok: bool,

    /// Total bed capacity
    #[serde(rename = "totalBeds")]
    pub total_beds: u32,

    /// Occupied beds, derived as `max(totalBeds - available, 0)`
    #[serde(rename = "occupiedBeds")]
    pub occupied_beds: u32,

    /// When the record was produced by the transformer
    pub last_verified_at: DateTime<Utc>,

    /// Provenance tag
    pub source: String,
}

impl ShelterRecord {
    /// Creates a record with every optional field empty and every
    /// defaulted field at its sentinel.
    pub fn new(name: impl Into<String>, last_verified_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            address: UNKNOWN_ADDRESS.to_string(),
            phone: None,
            shelter_type: "general".to_string(),
            status: "open".to_string(),
            location: None,
            hours_text: None,
            notes: None,
            services: Vec::new(),
            populations: BTreeSet::from([DEFAULT_POPULATION.to_string()]),
            ada: false,
            pets_ok: false,
            total_beds: 0,
            occupied_beds: 0,
            last_verified_at,
            source: SOURCE_TAG.to_string(),
        }
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}
