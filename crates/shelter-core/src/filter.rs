//! Validity filter.
//!
//! Rejection is expected data attrition, not an error: the outcome keeps
//! the rejected records so callers can count and log them.

use crate::types::{ShelterRecord, UNKNOWN_SHELTER};

/// Result of filtering a record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Records that passed, in input order
    pub accepted: Vec<ShelterRecord>,
    /// Records that were dropped, in input order
    pub rejected: Vec<ShelterRecord>,
}

impl FilterOutcome {
    /// Number of dropped records.
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// A record is valid iff it has a non-empty name that is not the sentinel.
pub fn is_valid(record: &ShelterRecord) -> bool {
    !record.name.is_empty() && record.name != UNKNOWN_SHELTER
}

/// Splits records into accepted and rejected sets.
pub fn filter_records(records: Vec<ShelterRecord>) -> FilterOutcome {
    let (accepted, rejected): (Vec<_>, Vec<_>) = records.into_iter().partition(is_valid);

    for record in &rejected {
        tracing::debug!(name = %record.name, address = %record.address, "Dropping invalid record");
    }

    FilterOutcome { accepted, rejected }
}
