//! Feature transformer: ArcGIS feature to [`ShelterRecord`].
//!
//! The transform is pure and total. Every field has an ordered list of
//! attribute aliases (legacy layers publish the same data under different
//! names) and a fallback default, so no input can make it fail.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::keywords::{TextBlob, allows_pets, is_ada_accessible};
use crate::types::{
    DEFAULT_POPULATION, Location, RawFeature, SOURCE_TAG, ShelterRecord, UNKNOWN_ADDRESS,
    UNKNOWN_SHELTER,
};

/// Attribute aliases per record field, in lookup order.
pub mod aliases {
    /// Shelter name
    pub const NAME: &[&str] = &["NAME", "SHELTER_NAME"];
    /// Street address
    pub const ADDRESS: &[&str] = &["ADDRESS", "LOCATION"];
    /// Contact phone
    pub const PHONE: &[&str] = &["PHONE", "CONTACT"];
    /// Shelter category
    pub const TYPE: &[&str] = &["TYPE", "SHELTER_TYPE"];
    /// Operating status
    pub const STATUS: &[&str] = &["STATUS"];
    /// Opening hours
    pub const HOURS: &[&str] = &["HOURS"];
    /// Intake notes / restrictions
    pub const NOTES: &[&str] = &["NOTES", "RESTRICTIONS"];
    /// Comma-separated services list
    pub const SERVICES: &[&str] = &["SERVICES"];
    /// Bed capacity
    pub const CAPACITY: &[&str] = &["CAPACITY", "TOTAL_BEDS"];
    /// Beds currently available
    pub const AVAILABLE: &[&str] = &["AVAILABLE", "BEDS_AVAILABLE"];
}

/// Default shelter category.
pub const DEFAULT_TYPE: &str = "general";

/// Default operating status.
pub const DEFAULT_STATUS: &str = "open";

/// Transforms a feature, stamping it with the current time.
pub fn transform(feature: &RawFeature) -> ShelterRecord {
    transform_at(feature, Utc::now())
}

/// Transforms a feature, stamping it with `verified_at`.
pub fn transform_at(feature: &RawFeature, verified_at: DateTime<Utc>) -> ShelterRecord {
    let hours_text = first_text(feature, aliases::HOURS);
    let notes = first_text(feature, aliases::NOTES);

    let blob = TextBlob::from_fields([notes.as_deref(), hours_text.as_deref()]);

    let capacity = first_integer(feature, aliases::CAPACITY);
    let available = first_integer(feature, aliases::AVAILABLE);

    ShelterRecord {
        name: first_text(feature, aliases::NAME).unwrap_or_else(|| UNKNOWN_SHELTER.to_string()),
        address: first_text(feature, aliases::ADDRESS)
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
        phone: first_text(feature, aliases::PHONE),
        shelter_type: first_text(feature, aliases::TYPE)
            .unwrap_or_else(|| DEFAULT_TYPE.to_string()),
        status: first_text(feature, aliases::STATUS)
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        location: location_of(feature),
        services: first_text(feature, aliases::SERVICES)
            .map(|raw| split_list(&raw))
            .unwrap_or_default(),
        populations: BTreeSet::from([DEFAULT_POPULATION.to_string()]),
        ada: is_ada_accessible(&blob),
        pets_ok: allows_pets(&blob),
        total_beds: clamp_beds(capacity),
        occupied_beds: occupied_beds(capacity, available),
        hours_text,
        notes,
        last_verified_at: verified_at,
        source: SOURCE_TAG.to_string(),
    }
}

/// Occupied beds: `max(totalBeds - available, 0)`.
///
/// `totalBeds` is the capacity clamped into `u32`. `available` is used as
/// reported, so a negative count raises occupancy above capacity.
pub fn occupied_beds(capacity: i64, available: i64) -> u32 {
    let total = i64::from(clamp_beds(capacity));
    clamp_beds(total.saturating_sub(available))
}

fn clamp_beds(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Returns the first alias whose value is present.
///
/// Presence follows the truthiness the source layers were written
/// against: `null`, `""`, `0`, and `false` count as missing.
pub fn first_present<'a>(feature: &'a RawFeature, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| feature.attribute(key))
        .find(|value| is_present(value))
}

/// First present alias rendered as text. Nested arrays/objects are skipped.
pub fn first_text(feature: &RawFeature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| feature.attribute(key))
        .filter(|value| is_present(value))
        .find_map(scalar_text)
}

/// First present alias parsed as a base-10 integer, or zero.
pub fn first_integer(feature: &RawFeature, keys: &[&str]) -> i64 {
    first_present(feature, keys).map(parse_integer).unwrap_or(0)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parses a base-10 integer the lenient way feature services need.
///
/// Strings accept leading whitespace and an optional sign, then read
/// digits up to the first non-digit (`"20 beds"` is 20). Numbers are
/// truncated toward zero. Anything else, or a string with no leading
/// digits, is zero.
pub fn parse_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_integer_prefix(s),
        _ => 0,
    }
}

fn parse_integer_prefix(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }

    // Overlong digit runs saturate rather than wrap.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn location_of(feature: &RawFeature) -> Option<Location> {
    let geometry = feature.geometry?;
    let usable = |c: Option<f64>| c.filter(|v| v.is_finite() && *v != 0.0);

    match (usable(geometry.x), usable(geometry.y)) {
        (Some(lng), Some(lat)) => Some(Location { lat, lng }),
        _ => None,
    }
}
