//! Core types for the shelter import pipeline.

mod feature;
mod proptests;
mod record;

pub use feature::{Geometry, RawFeature};
pub use record::{
    DEFAULT_POPULATION, Location, SOURCE_TAG, ShelterRecord, UNKNOWN_ADDRESS, UNKNOWN_SHELTER,
};
