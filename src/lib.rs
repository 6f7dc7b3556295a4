//! lead_harvest library: multi-source business lead aggregation
//!
//! This library fans a `(location, category)` query out to several business
//! directory sources, normalizes and deduplicates what they return, fills in
//! coordinates, and stores the result idempotently in SQLite.
//!
//! # Example
//!
//! ```no_run
//! use lead_harvest::{Config, Orchestrator};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("leads.db"),
//!     ..Default::default()
//! };
//!
//! let orchestrator = Orchestrator::from_config(&config).await?;
//! let summary = orchestrator
//!     .run_quick("Mumbai", Some("restaurants"), None)
//!     .await?;
//! println!(
//!     "{} unique businesses from {} source(s), {} error(s)",
//!     summary.total_businesses,
//!     summary.sources_scraped.len(),
//!     summary.errors.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
pub mod dedupe;
mod error_handling;
pub mod export;
pub mod geocode;
pub mod initialization;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod sources;
pub mod storage;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    categorize_source_error, DatabaseError, FailureKind, InitializationError, ScrapeError,
    SourceError,
};
pub use models::{Business, DataType, GeocodeQuality, RawCandidate, ScrapeSession, SessionStatus};
pub use orchestrator::{Orchestrator, ProbeResult, QualityReport, RunSettings, RunSummary};
pub use sources::{SearchOutcome, SearchQuery, SourceAdapter, SourceRegistry};
pub use storage::{LeadFilter, LeadStore, SqliteLeadStore};
pub use utils::sanitize_and_truncate_error_message;
