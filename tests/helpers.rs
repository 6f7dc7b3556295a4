// Shared test helpers: stub sources, stores and fast settings.
//
// Included by the integration tests with `#[path = "helpers.rs"] mod helpers;`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use lead_harvest::config::DelayRange;
use lead_harvest::geocode::GeocodingEnricher;
use lead_harvest::models::ScrapeSession;
use lead_harvest::sources::FetchSettings;
use lead_harvest::storage::StoreStatistics;
use lead_harvest::{
    Business, DatabaseError, LeadFilter, LeadStore, Orchestrator, RawCandidate, RunSettings,
    SearchOutcome, SearchQuery, SessionStatus, SourceAdapter, SourceRegistry, SqliteLeadStore,
};

/// A candidate with a name, phone and address.
pub fn candidate(name: &str, contact: &str, address: &str) -> RawCandidate {
    RawCandidate {
        name: Some(name.to_string()),
        contact: Some(contact.to_string()),
        address: Some(address.to_string()),
        ..Default::default()
    }
}

/// A candidate the normalizer must reject (no contact, website or address).
pub fn invalid_candidate(name: &str) -> RawCandidate {
    RawCandidate {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// Three valid Mumbai candidates and one invalid one.
pub fn mumbai_candidates() -> Vec<RawCandidate> {
    vec![
        candidate("Trishna", "+91 98200 12345", "7 Sai Baba Marg, Fort, Mumbai"),
        candidate("Britannia & Co", "9820012346", "Wakefield House, Ballard Estate, Mumbai"),
        candidate("Cafe Madras", "98200 12347", "38B King's Circle, Matunga, Mumbai"),
        invalid_candidate("Nameplate Only"),
    ]
}

/// Adapter returning a fixed outcome and counting its calls.
pub struct StubAdapter {
    id: String,
    outcome: SearchOutcome,
    calls: AtomicUsize,
}

impl StubAdapter {
    /// Returns `candidates` on every call.
    pub fn returning(id: &str, candidates: Vec<RawCandidate>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: SearchOutcome::found(candidates),
            calls: AtomicUsize::new(0),
        })
    }

    /// Fails with `message` on every call.
    pub fn failing(id: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: SearchOutcome::failed(message),
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of searches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outcome = self.outcome.clone();
        outcome.candidates.truncate(query.max_results);
        outcome
    }
}

/// Store whose inserts always fail; everything else hits an in-memory store.
pub struct FailingStore {
    inner: SqliteLeadStore,
}

impl FailingStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteLeadStore::open_in_memory()
                .await
                .expect("Failed to open in-memory store"),
        }
    }
}

#[async_trait]
impl LeadStore for FailingStore {
    async fn create_session(&self, location: &str) -> Result<i64, DatabaseError> {
        self.inner.create_session(location).await
    }

    async fn update_session(
        &self,
        session_id: i64,
        total_scraped: usize,
        status: SessionStatus,
    ) -> Result<(), DatabaseError> {
        self.inner
            .update_session(session_id, total_scraped, status)
            .await
    }

    async fn insert_batch(&self, _records: &[Business]) -> Result<usize, DatabaseError> {
        Err(DatabaseError::SqlError(sqlx::Error::PoolClosed))
    }

    async fn query(&self, filter: &LeadFilter) -> Result<Vec<Business>, DatabaseError> {
        self.inner.query(filter).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Business>, DatabaseError> {
        self.inner.search(term).await
    }

    async fn statistics(&self) -> Result<StoreStatistics, DatabaseError> {
        self.inner.statistics().await
    }

    async fn session(&self, session_id: i64) -> Result<Option<ScrapeSession>, DatabaseError> {
        self.inner.session(session_id).await
    }
}

/// A migrated in-memory store.
pub async fn memory_store() -> Arc<SqliteLeadStore> {
    Arc::new(
        SqliteLeadStore::open_in_memory()
            .await
            .expect("Failed to open in-memory store"),
    )
}

/// Orchestrator over stub `adapters` with no delays and an offline geocoder.
pub fn orchestrator_with(store: Arc<dyn LeadStore>, adapters: Vec<Arc<StubAdapter>>) -> Orchestrator {
    let mut registry = SourceRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    Orchestrator::new(
        store,
        registry,
        GeocodingEnricher::offline(),
        RunSettings::immediate(),
    )
}

/// Transport settings for talking to a local mock server.
pub fn fast_fetch_settings() -> FetchSettings {
    FetchSettings {
        timeout: Duration::from_secs(5),
        max_retries: 0,
        user_agent: Some("lead_harvest-tests/1.0".to_string()),
        request_delay: DelayRange::none(),
    }
}

/// A stored-shape record with a millisecond-precision timestamp.
pub fn business(name: &str, location: &str, address: Option<&str>) -> Business {
    let now = chrono::Utc::now();
    Business {
        name: name.to_string(),
        location: location.to_string(),
        category: Some("restaurants".to_string()),
        address: address.map(str::to_string),
        contact: Some("9876543210".to_string()),
        website: None,
        latitude: None,
        longitude: None,
        geocode_quality: None,
        source: "directoryA".to_string(),
        scraped_at: chrono::DateTime::from_timestamp_millis(now.timestamp_millis())
            .unwrap_or(now),
        data_type: lead_harvest::DataType::Raw,
    }
}
