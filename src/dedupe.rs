//! Duplicate collapsing.
//!
//! Two records are duplicates when their lower-cased, trimmed name and
//! location match and the first 50 characters of their lower-cased address
//! match. Nothing fuzzier is attempted.

use std::collections::HashSet;

use crate::config::DEDUPE_ADDRESS_PREFIX_CHARS;
use crate::models::Business;

/// Key identifying a business within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    name: String,
    location: String,
    address_prefix: String,
}

impl DedupeKey {
    /// Builds the key for a record.
    pub fn of(business: &Business) -> Self {
        let address = business
            .address
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        Self {
            name: business.name.trim().to_lowercase(),
            location: business.location.trim().to_lowercase(),
            address_prefix: address.chars().take(DEDUPE_ADDRESS_PREFIX_CHARS).collect(),
        }
    }
}

/// Removes duplicates, keeping the first occurrence and the input order.
pub fn dedupe(records: Vec<Business>) -> Vec<Business> {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<Business> = records
        .into_iter()
        .filter(|record| seen.insert(DedupeKey::of(record)))
        .collect();
    if unique.len() < before {
        log::debug!("Collapsed {} duplicate records", before - unique.len());
    }
    unique
}
