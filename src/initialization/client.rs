//! HTTP client initialization.
//!
//! Adapters build a fresh client for every search (the client is the scoped
//! network session), the geocoder keeps one for its lifetime.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, GEOCODER_USER_AGENT, GEOCODING_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Builds an HTTP client for one adapter session.
///
/// Creates a `reqwest::Client` configured with:
/// - The request timeout from the configuration
/// - A cookie-less, redirect-following (up to 10 hops) connection pool
///
/// The User-Agent is set per request so it can rotate.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(timeout: Duration) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Builds the client used for geocoding lookups.
///
/// Nominatim's usage policy requires an identifying User-Agent, so this one is
/// fixed rather than rotated.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_geocoding_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let timeout = Duration::from_secs(GEOCODING_TIMEOUT_SECS.min(config.timeout_seconds.max(1)));
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(GEOCODER_USER_AGENT)
        .build()?;
    Ok(client)
}
