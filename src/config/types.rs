//! Configuration types.
//!
//! This module defines the library configuration and the enums shared with the
//! command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use rand::Rng;

use crate::config::constants::{
    DB_PATH, GEOCODING_ENDPOINT, GOOGLE_PLACES_BASE_URL, INTER_SOURCE_DELAY_MAX_MS,
    INTER_SOURCE_DELAY_MIN_MS, JUSTDIAL_BASE_URL, JUSTDIAL_MOBILE_BASE_URL, MAX_RETRIES,
    REQUEST_DELAY_MAX_MS, REQUEST_DELAY_MIN_MS, REQUEST_TIMEOUT_SECS, SOURCE_TIMEOUT,
    YELLOW_PAGES_SEARCH_URL,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Inclusive range for a randomized pause.
///
/// A zero range (`DelayRange::none()`) disables the pause entirely, which is
/// what tests use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    /// Lower bound in milliseconds
    pub min_ms: u64,
    /// Upper bound in milliseconds
    pub max_ms: u64,
}

impl DelayRange {
    /// Creates a range; bounds are swapped if given in the wrong order.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    /// A range that never pauses.
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// Draws a duration from the range.
    pub fn sample(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// Sleeps for a sampled duration. This is a yield point, not a blocking sleep.
    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            log::debug!("Pausing for {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

/// Endpoint queried by the generic directory adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEndpoint {
    /// Label stored as the listing's origin in logs
    pub label: String,
    /// Search URL (query parameters are appended)
    pub search_url: String,
    /// Query parameter carrying the search terms
    pub terms_param: String,
    /// Query parameter carrying the location
    pub location_param: String,
}

impl DirectoryEndpoint {
    /// The default Yellow Pages style endpoint.
    pub fn yellow_pages() -> Self {
        Self {
            label: "Yellow Pages".to_string(),
            search_url: YELLOW_PAGES_SEARCH_URL.to_string(),
            terms_param: "search_terms".to_string(),
            location_param: "geo_location_terms".to_string(),
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use lead_harvest::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("leads.db"),
///     max_retries: 1,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries after the initial attempt for retriable failures
    pub max_retries: usize,

    /// Fixed User-Agent; `None` rotates through the built-in list
    pub user_agent: Option<String>,

    /// Pause between two requests of the same adapter (the per-source rate-limit window)
    pub request_delay: DelayRange,

    /// Pause between two sources of the same run
    pub inter_source_delay: DelayRange,

    /// Deadline for one source's whole search; `None` disables it
    pub source_timeout: Option<Duration>,

    /// Canonical ids of the adapters to register
    pub enabled_sources: Vec<String>,

    /// Google Places API key
    pub maps_api_key: Option<String>,

    /// Whether the geocoding service is queried (fallback table otherwise)
    pub geocoding_enabled: bool,

    /// Nominatim-compatible search endpoint
    pub geocoding_endpoint: String,

    /// Base URL of the directory site adapter
    pub directory_base_url: String,

    /// Mobile base URL of the directory site adapter
    pub directory_mobile_base_url: Option<String>,

    /// Base URL of the maps API adapter
    pub maps_base_url: String,

    /// Endpoints queried by the generic directory adapter
    pub local_directories: Vec<DirectoryEndpoint>,
}

impl Config {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            max_retries: MAX_RETRIES,
            user_agent: None,
            request_delay: DelayRange::new(REQUEST_DELAY_MIN_MS, REQUEST_DELAY_MAX_MS),
            inter_source_delay: DelayRange::new(
                INTER_SOURCE_DELAY_MIN_MS,
                INTER_SOURCE_DELAY_MAX_MS,
            ),
            source_timeout: Some(SOURCE_TIMEOUT),
            enabled_sources: vec![
                "justdial".to_string(),
                "google_maps".to_string(),
                "local_directories".to_string(),
            ],
            maps_api_key: None,
            geocoding_enabled: true,
            geocoding_endpoint: GEOCODING_ENDPOINT.to_string(),
            directory_base_url: JUSTDIAL_BASE_URL.to_string(),
            directory_mobile_base_url: Some(JUSTDIAL_MOBILE_BASE_URL.to_string()),
            maps_base_url: GOOGLE_PLACES_BASE_URL.to_string(),
            local_directories: vec![DirectoryEndpoint::yellow_pages()],
        }
    }
}
