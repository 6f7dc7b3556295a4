//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including timeouts, result caps, retry parameters, and the geocoding
//! fallback table.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./data/businesses.db";

/// Per-request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Per-source deadline in seconds
/// Covers every page, retry, and delay an adapter performs for one run.
/// A source that exceeds it is reported as failed and the run moves on.
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default User-Agent string for HTTP requests.
///
/// Used when the rotation list is disabled (e.g. `--user-agent` was given).
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// User-Agent strings rotated per request by the directory adapters.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// User-Agent sent to the geocoding service (Nominatim asks for an identifying agent)
pub const GEOCODER_USER_AGENT: &str = "lead_harvest/0.1 (business directory aggregation)";

// Politeness delays
/// Minimum delay between two requests issued by the same adapter, in milliseconds
pub const REQUEST_DELAY_MIN_MS: u64 = 1_000;
/// Maximum delay between two requests issued by the same adapter, in milliseconds
pub const REQUEST_DELAY_MAX_MS: u64 = 3_000;
/// Minimum pause between two sources of the same run, in milliseconds
pub const INTER_SOURCE_DELAY_MIN_MS: u64 = 3_000;
/// Maximum pause between two sources of the same run, in milliseconds
pub const INTER_SOURCE_DELAY_MAX_MS: u64 = 6_000;

// In-flight caps
/// Maximum concurrent page fetches inside one adapter
pub const MAX_IN_FLIGHT_REQUESTS: usize = 3;
/// Maximum concurrent geocoding lookups for one batch
pub const MAX_IN_FLIGHT_GEOCODES: usize = 2;

// Run modes
/// Per-source result cap for quick runs
pub const QUICK_MAX_RESULTS: usize = 20;
/// Per-source result cap for comprehensive runs
pub const COMPREHENSIVE_MAX_RESULTS: usize = 50;
/// Sources used by quick runs when the caller selects none
pub const QUICK_DEFAULT_SOURCES: &[&str] = &["justdial"];
/// Listings per directory result page (used to derive the page count from a cap)
pub const RESULTS_PER_PAGE: usize = 20;
/// Upper bound on result pages fetched per search term
pub const MAX_PAGES_PER_TERM: usize = 3;
/// Search terms used when a run has no category
pub const DEFAULT_SEARCH_TERMS: &[&str] = &["restaurants", "shops", "services"];
/// Maximum number of search terms tried per run
pub const MAX_SEARCH_TERMS: usize = 2;
/// Text-search pages followed per maps query (the API serves at most three)
pub const MAPS_MAX_PAGES: usize = 3;
/// Wait before redeeming a maps `next_page_token`, which is not valid immediately
pub const MAPS_PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

// Record validation
/// Maximum business name length in characters
pub const MAX_NAME_LENGTH: usize = 200;
/// Address prefix length (characters) used by the dedupe key
pub const DEDUPE_ADDRESS_PREFIX_CHARS: usize = 50;
/// Minimum digits for an accepted phone number
pub const MIN_PHONE_DIGITS: usize = 10;
/// Maximum digits for an accepted phone number (E.164)
pub const MAX_PHONE_DIGITS: usize = 15;

// Error message limits
/// Maximum error message length in characters (500 chars)
/// Error strings longer than this are truncated before landing in a run summary
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Default number of retries after the initial attempt
pub const MAX_RETRIES: usize = 3;

// HTTP status codes (for clarity and consistency)
/// HTTP 403, treated as bot detection
pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
/// HTTP 429, retried with backoff
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// Geocoding
/// Nominatim search endpoint (OpenStreetMap)
pub const GEOCODING_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
/// Geocoding request timeout in seconds
pub const GEOCODING_TIMEOUT_SECS: u64 = 10;
/// Attempts per lookup; a timeout on the first attempt is retried once
pub const GEOCODING_ATTEMPTS: usize = 2;
/// Minimum spacing between two geocoding requests (Nominatim allows one per second)
pub const GEOCODING_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// City-level coordinates used when the geocoding service cannot answer.
///
/// Matched case-insensitively as a substring of the address, in table order.
pub const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("delhi", 28.6139, 77.2090),
    ("mumbai", 19.0760, 72.8777),
    ("bangalore", 12.9716, 77.5946),
    ("chennai", 13.0827, 80.2707),
    ("kolkata", 22.5726, 88.3639),
    ("hyderabad", 17.3850, 78.4867),
    ("pune", 18.5204, 73.8567),
    ("ahmedabad", 23.0225, 72.5714),
    ("jaipur", 26.9124, 75.7873),
    ("agra", 27.1767, 78.0081),
];

/// Reference coordinate used when no known city matches (New Delhi)
pub const DEFAULT_COORDINATES: (f64, f64) = (28.6139, 77.2090);

// Upstream endpoints
/// JustDial base URL
pub const JUSTDIAL_BASE_URL: &str = "https://www.justdial.com";
/// JustDial mobile site base URL (tried after the desktop URL shapes)
pub const JUSTDIAL_MOBILE_BASE_URL: &str = "https://m.justdial.com";
/// Google Places API base URL
pub const GOOGLE_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
/// Yellow Pages style search URL used by the generic directory adapter
pub const YELLOW_PAGES_SEARCH_URL: &str = "https://www.yellowpages.com/search";
