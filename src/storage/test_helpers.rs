//! Shared test helpers for storage module tests.

#[cfg(test)]
use chrono::{DateTime, Utc};
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::models::{Business, DataType};
#[cfg(test)]
use crate::storage::{init_in_memory_pool, run_migrations};

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = init_in_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates a valid business record scraped now, at millisecond precision
/// so it survives a store round trip unchanged.
#[cfg(test)]
pub fn sample_business(name: &str, location: &str, address: Option<&str>) -> Business {
    let now = DateTime::<Utc>::from_timestamp_millis(Utc::now().timestamp_millis())
        .expect("current time is representable");
    Business {
        name: name.to_string(),
        location: location.to_string(),
        category: None,
        address: address.map(str::to_string),
        contact: Some("9876543210".to_string()),
        website: None,
        latitude: None,
        longitude: None,
        geocode_quality: None,
        source: "justdial".to_string(),
        scraped_at: now,
        data_type: DataType::Raw,
    }
}
