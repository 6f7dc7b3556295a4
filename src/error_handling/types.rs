//! Error type definitions.
//!
//! This module defines the error types used throughout the application and the
//! failure categories reported for sources.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Errors raised inside a source adapter.
///
/// These never leave the adapter: they are logged, categorized, and folded
/// into the adapter's `SearchOutcome` as a one-line message.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A required credential (e.g. an API key) is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Transport-level failure, including non-success HTTP statuses.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The upstream API answered with an application-level error status.
    #[error("API returned status {0}")]
    Api(String),

    /// The response could not be interpreted.
    #[error("could not parse response: {0}")]
    Parse(String),

    /// The adapter's network session could not be opened.
    #[error("could not open session: {0}")]
    Session(#[from] InitializationError),
}

/// Errors that abort an orchestration run.
///
/// Only programmer errors and persistence failures propagate; every other
/// failure is absorbed into the run summary.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The caller passed arguments the run cannot work with.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The persistence store failed; the run cannot continue without it.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DatabaseError),
}

/// Categories of source-level failures.
///
/// Used to prefix the one-line error recorded in a run summary so that
/// blocked sources read differently from flaky networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// The request timed out
    Timeout,
    /// No connection could be made
    Connect,
    /// HTTP 403, usually an anti-bot wall
    BotDetection,
    /// HTTP 429
    TooManyRequests,
    /// HTTP 404
    NotFound,
    /// Any other 4xx
    ClientError,
    /// Any 5xx
    ServerError,
    /// The body could not be read or decoded
    Decode,
    /// The API answered with an error status
    Api,
    /// A required credential is not configured
    MissingCredential,
    /// The page did not have the expected structure
    Parse,
    /// Anything else
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Human-readable label, used as the prefix of a source's error line.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Request timeout",
            FailureKind::Connect => "Connection failed",
            FailureKind::BotDetection => "Bot detection (403 Forbidden)",
            FailureKind::TooManyRequests => "Too many requests (429)",
            FailureKind::NotFound => "Not Found (404)",
            FailureKind::ClientError => "Client error (4xx)",
            FailureKind::ServerError => "Server error (5xx)",
            FailureKind::Decode => "Response decode error",
            FailureKind::Api => "API error",
            FailureKind::MissingCredential => "Missing credential",
            FailureKind::Parse => "Parse error",
            FailureKind::Other => "Request error",
        }
    }
}
