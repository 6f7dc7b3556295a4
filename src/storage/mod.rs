//! Persistence store.
//!
//! The orchestrator talks to storage through [`LeadStore`] only; the SQLite
//! implementation lives in [`SqliteLeadStore`]. Inserts are idempotent on
//! the `(name, address, location)` key, so concurrent runs over overlapping
//! data can waste work but never corrupt it.

mod businesses;
mod migrations;
mod pool;
mod sessions;
mod statistics;
#[cfg(test)]
pub(crate) mod test_helpers;

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::models::{Business, ScrapeSession, SessionStatus};

pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_in_memory_pool};
pub use statistics::{DailyCount, LocationCount, StoreStatistics};

/// Filter for [`LeadStore::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    /// Substring of the location
    pub location: Option<String>,
    /// Substring of the category
    pub category: Option<String>,
    /// Inclusive UTC date range of `scraped_at`
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Durable storage for businesses and scrape sessions.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Opens a session in the `running` state.
    async fn create_session(&self, location: &str) -> Result<i64, DatabaseError>;

    /// Closes a session. Called exactly once per run.
    async fn update_session(
        &self,
        session_id: i64,
        total_scraped: usize,
        status: SessionStatus,
    ) -> Result<(), DatabaseError>;

    /// Inserts records, silently skipping existing keys. Returns the number
    /// of new rows.
    async fn insert_batch(&self, records: &[Business]) -> Result<usize, DatabaseError>;

    /// Records matching `filter`, newest first.
    async fn query(&self, filter: &LeadFilter) -> Result<Vec<Business>, DatabaseError>;

    /// Records whose name, address or category contains `term`.
    async fn search(&self, term: &str) -> Result<Vec<Business>, DatabaseError>;

    /// Store-wide totals.
    async fn statistics(&self) -> Result<StoreStatistics, DatabaseError>;

    /// One session, if it exists.
    async fn session(&self, session_id: i64) -> Result<Option<ScrapeSession>, DatabaseError>;
}

/// SQLite-backed [`LeadStore`].
#[derive(Debug, Clone)]
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    /// Wraps an existing pool. Migrations must already be applied.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `db_path` and migrates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or migrations fail.
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        let pool = init_db_pool_with_path(db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(Self::new(pool))
    }

    /// Opens a migrated private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or migrations fail.
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = init_in_memory_pool()
            .await
            .context("Failed to open in-memory database")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn create_session(&self, location: &str) -> Result<i64, DatabaseError> {
        sessions::create_session(&self.pool, location).await
    }

    async fn update_session(
        &self,
        session_id: i64,
        total_scraped: usize,
        status: SessionStatus,
    ) -> Result<(), DatabaseError> {
        sessions::update_session(&self.pool, session_id, total_scraped, status).await
    }

    async fn insert_batch(&self, records: &[Business]) -> Result<usize, DatabaseError> {
        businesses::insert_batch(&self.pool, records).await
    }

    async fn query(&self, filter: &LeadFilter) -> Result<Vec<Business>, DatabaseError> {
        businesses::query(&self.pool, filter).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Business>, DatabaseError> {
        businesses::search(&self.pool, term).await
    }

    async fn statistics(&self) -> Result<StoreStatistics, DatabaseError> {
        statistics::statistics(&self.pool).await
    }

    async fn session(&self, session_id: i64) -> Result<Option<ScrapeSession>, DatabaseError> {
        sessions::session(&self.pool, session_id).await
    }
}
