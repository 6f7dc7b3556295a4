//! Scrape orchestration.
//!
//! An [`Orchestrator`] owns the injected collaborators of a run: the
//! persistence store, the source registry and the geocoding enricher. Sources
//! are processed one after another; each one goes through
//! normalize, dedupe, enrich and persist before the next starts, so a batch
//! that reached the store stays there even if the process is stopped later.

mod modes;
mod quality;
mod run;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Config, DelayRange};
use crate::geocode::GeocodingEnricher;
use crate::models::Business;
use crate::sources::SourceRegistry;
use crate::storage::{LeadStore, SqliteLeadStore};

pub use quality::QualityReport;

/// Timing knobs of the orchestration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Pause between two sources
    pub inter_source_delay: DelayRange,
    /// Deadline for one source's search; `None` waits indefinitely
    pub source_timeout: Option<Duration>,
}

impl RunSettings {
    /// No pauses and no deadline.
    pub fn immediate() -> Self {
        Self {
            inter_source_delay: DelayRange::none(),
            source_timeout: None,
        }
    }

    /// Settings taken from the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            inter_source_delay: config.inter_source_delay,
            source_timeout: config.source_timeout,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Per-source counts of one run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    /// Canonical source id
    pub source: String,
    /// Valid records after per-source dedupe
    pub found: usize,
    /// Records that were new to the store
    pub stored: usize,
}

/// Everything a caller learns about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Location searched, trimmed
    pub location: String,
    /// Category searched, if any
    pub category: Option<String>,
    /// Records after the global dedupe
    pub total_businesses: usize,
    /// Canonical ids of the sources that were invoked
    pub sources_scraped: Vec<String>,
    /// Counts per invoked source, in processing order
    pub businesses_by_source: Vec<SourceOutcome>,
    /// One line per failing or unknown source
    pub errors: Vec<String>,
    /// Globally deduplicated records, first occurrence wins
    pub businesses: Vec<Business>,
    /// Id of the stored scrape session
    pub session_id: i64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the session was closed
    pub completed_at: DateTime<Utc>,
    /// Field coverage of `businesses`
    pub quality: QualityReport,
}

impl RunSummary {
    /// `found` counts keyed by source id.
    pub fn counts_by_source(&self) -> BTreeMap<String, usize> {
        self.businesses_by_source
            .iter()
            .map(|o| (o.source.clone(), o.found))
            .collect()
    }

    /// New rows written to the store across all sources.
    pub fn stored_total(&self) -> usize {
        self.businesses_by_source.iter().map(|o| o.stored).sum()
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }

    /// Whether every requested source ran cleanly.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Health of one source as seen by [`Orchestrator::probe_sources`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Canonical source id
    pub source: String,
    /// At least one candidate came back
    pub working: bool,
    /// Failure message, when the source reported one
    pub failure: Option<String>,
}

/// Coordinates scrape runs over a store, a registry and an enricher.
pub struct Orchestrator {
    store: Arc<dyn LeadStore>,
    registry: SourceRegistry,
    enricher: GeocodingEnricher,
    settings: RunSettings,
}

impl Orchestrator {
    /// Builds an orchestrator from injected collaborators.
    pub fn new(
        store: Arc<dyn LeadStore>,
        registry: SourceRegistry,
        enricher: GeocodingEnricher,
        settings: RunSettings,
    ) -> Self {
        Self {
            store,
            registry,
            enricher,
            settings,
        }
    }

    /// Opens the configured database and registers the configured sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, a
    /// configured source is unknown, or the geocoding client cannot be built.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteLeadStore::open(&config.db_path).await?;
        let registry = SourceRegistry::from_config(config)?;
        let enricher =
            GeocodingEnricher::from_config(config).context("Failed to initialize geocoder")?;
        Ok(Self::new(
            Arc::new(store),
            registry,
            enricher,
            RunSettings::from_config(config),
        ))
    }

    /// The persistence store runs write to.
    pub fn store(&self) -> &Arc<dyn LeadStore> {
        &self.store
    }

    /// The registered sources.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }
}
