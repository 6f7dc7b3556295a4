//! Error handling.
//!
//! This module provides:
//! - Error type definitions (initialization, database, source, run)
//! - Failure categorization for source errors
//! - Retry strategy configuration
//!
//! Source errors never escape their adapter; they are categorized and turned
//! into one-line messages. Database errors are the only runtime failures that
//! abort a run.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_source_error, get_retry_strategy};
pub use types::{DatabaseError, FailureKind, InitializationError, ScrapeError, SourceError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_failure_kind_labels_are_unique() {
        let labels: Vec<&str> = FailureKind::iter().map(|k| k.as_str()).collect();
        let mut deduped = labels.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(labels.len(), deduped.len());
    }

    #[test]
    fn test_failure_kind_display_matches_as_str() {
        for kind in FailureKind::iter() {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_scrape_error_from_database_error() {
        let err: ScrapeError = DatabaseError::SqlError(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, ScrapeError::Persistence(_)));
        assert!(err.to_string().starts_with("Persistence failure"));
    }
}
