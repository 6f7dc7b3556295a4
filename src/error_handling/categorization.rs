//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize source errors and configure
//! retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{FailureKind, SourceError};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - At most `max_retries` retries after the initial attempt
pub fn get_retry_strategy(max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(max_retries)
}

/// Categorizes a `reqwest::Error` into a `FailureKind`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FailureKind {
    if let Some(status) = error.status() {
        match status.as_u16() {
            crate::config::HTTP_STATUS_FORBIDDEN => return FailureKind::BotDetection,
            404 => return FailureKind::NotFound,
            crate::config::HTTP_STATUS_TOO_MANY_REQUESTS => return FailureKind::TooManyRequests,
            _ if status.is_client_error() => return FailureKind::ClientError,
            _ if status.is_server_error() => return FailureKind::ServerError,
            _ => {}
        }
    }

    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_decode() {
        FailureKind::Decode
    } else {
        FailureKind::Other
    }
}

/// Categorizes a `SourceError` into a `FailureKind`.
pub fn categorize_source_error(error: &SourceError) -> FailureKind {
    match error {
        SourceError::MissingCredential(_) => FailureKind::MissingCredential,
        SourceError::Http(e) => categorize_reqwest_error(e),
        SourceError::Api(_) => FailureKind::Api,
        SourceError::Parse(_) => FailureKind::Parse,
        SourceError::Session(_) => FailureKind::Other,
    }
}
