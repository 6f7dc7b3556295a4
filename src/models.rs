//! Domain records shared by adapters, the pipeline and the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Unvalidated listing as produced by a source adapter.
///
/// Every field is optional; the normalizer decides what survives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    /// Business name as listed
    pub name: Option<String>,
    /// Phone number in any format
    pub contact: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Website URL, possibly without a scheme
    pub website: Option<String>,
    /// Category reported by the source
    pub category: Option<String>,
    /// City or area reported by the source
    pub location: Option<String>,
    /// Latitude reported by the source
    pub latitude: Option<f64>,
    /// Longitude reported by the source
    pub longitude: Option<f64>,
    /// Set by adapters backed by an authoritative API
    pub verified: bool,
}

/// How a record came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Scraped and normalized, nothing added
    Raw,
    /// Taken from an authoritative API
    Verified,
    /// Coordinates were added after scraping
    Enriched,
}

/// Provenance of a record's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GeocodeQuality {
    /// Supplied by the source itself
    Provided,
    /// Resolved by the geocoding service
    Exact,
    /// Centre of a city recognized in the address or location
    CityApproximate,
    /// Fixed reference coordinate; nothing else matched
    Default,
}

impl GeocodeQuality {
    /// True for the table-based fallbacks.
    pub fn is_approximate(&self) -> bool {
        matches!(self, GeocodeQuality::CityApproximate | GeocodeQuality::Default)
    }
}

/// Canonical business record.
///
/// `name` and `location` are never empty, and at least one of `contact`,
/// `website` or `address` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Business {
    /// Business name (whitespace collapsed, at most 200 characters)
    pub name: String,
    /// City or area
    pub location: String,
    /// Category, if known
    pub category: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Phone number, digits with an optional leading `+`
    pub contact: Option<String>,
    /// Website URL with a scheme
    pub website: Option<String>,
    /// Latitude in degrees
    pub latitude: Option<f64>,
    /// Longitude in degrees
    pub longitude: Option<f64>,
    /// Where the coordinates came from
    pub geocode_quality: Option<GeocodeQuality>,
    /// Canonical id of the adapter that produced the record
    pub source: String,
    /// When the record was normalized
    pub scraped_at: DateTime<Utc>,
    /// Provenance tag used in quality reporting
    pub data_type: DataType,
}

impl Business {
    /// Whether both coordinates are set.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Lifecycle state of a scrape session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, not yet finished
    Running,
    /// Finished with no source errors
    Completed,
    /// Finished, but at least one source failed or was unknown
    CompletedWithErrors,
}

/// One orchestration run as recorded by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeSession {
    /// Store-assigned id
    pub id: i64,
    /// Location the run was for
    pub location: String,
    /// Unique businesses the run produced
    pub total_scraped: i64,
    /// Session creation time
    pub started_at: DateTime<Utc>,
    /// Set when the session is closed
    pub completed_at: Option<DateTime<Utc>>,
    /// Current lifecycle state
    pub status: SessionStatus,
}

impl ScrapeSession {
    /// Seconds from start to completion, or to now while still running.
    pub fn duration_seconds(&self) -> i64 {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trips_through_strings() {
        assert_eq!(
            SessionStatus::CompletedWithErrors.to_string(),
            "completed_with_errors"
        );
        assert_eq!(
            SessionStatus::from_str("running").ok(),
            Some(SessionStatus::Running)
        );
        assert!(SessionStatus::from_str("paused").is_err());
    }

    #[test]
    fn test_geocode_quality_labels() {
        assert_eq!(GeocodeQuality::CityApproximate.to_string(), "city_approximate");
        assert!(GeocodeQuality::Default.is_approximate());
        assert!(!GeocodeQuality::Exact.is_approximate());
        assert!(!GeocodeQuality::Provided.is_approximate());
    }

    #[test]
    fn test_session_duration_uses_completion_time() {
        let started = Utc::now() - chrono::Duration::seconds(90);
        let session = ScrapeSession {
            id: 1,
            location: "Delhi".into(),
            total_scraped: 0,
            started_at: started,
            completed_at: Some(started + chrono::Duration::seconds(42)),
            status: SessionStatus::Completed,
        };
        assert_eq!(session.duration_seconds(), 42);
    }
}
