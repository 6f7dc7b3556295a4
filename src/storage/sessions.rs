//! Scrape session bookkeeping.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::models::{ScrapeSession, SessionStatus};

/// Opens a session in the `running` state and returns its id.
pub async fn create_session(pool: &SqlitePool, location: &str) -> Result<i64, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO scraping_sessions (location, total_scraped, started_at_ms, status)
         VALUES (?, 0, ?, ?)",
    )
    .bind(location)
    .bind(Utc::now().timestamp_millis())
    .bind(SessionStatus::Running.to_string())
    .execute(pool)
    .await
    .map_err(DatabaseError::SqlError)?;
    Ok(result.last_insert_rowid())
}

/// Closes a session with its final count and status.
pub async fn update_session(
    pool: &SqlitePool,
    session_id: i64,
    total_scraped: usize,
    status: SessionStatus,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE scraping_sessions
         SET total_scraped = ?, completed_at_ms = ?, status = ?
         WHERE id = ?",
    )
    .bind(total_scraped as i64)
    .bind(Utc::now().timestamp_millis())
    .bind(status.to_string())
    .bind(session_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::SqlError)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::SqlError(sqlx::Error::RowNotFound));
    }
    Ok(())
}

/// Loads one session.
pub async fn session(pool: &SqlitePool, session_id: i64) -> Result<Option<ScrapeSession>, DatabaseError> {
    let row = sqlx::query(
        "SELECT id, location, total_scraped, started_at_ms, completed_at_ms, status
         FROM scraping_sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::SqlError)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let decode = || -> Result<ScrapeSession, sqlx::Error> {
        let started_at_ms: i64 = row.try_get("started_at_ms")?;
        let completed_at_ms: Option<i64> = row.try_get("completed_at_ms")?;
        let status: String = row.try_get("status")?;
        Ok(ScrapeSession {
            id: row.try_get("id")?,
            location: row.try_get("location")?,
            total_scraped: row.try_get("total_scraped")?,
            started_at: millis_to_utc(started_at_ms)?,
            completed_at: completed_at_ms.map(millis_to_utc).transpose()?,
            status: SessionStatus::from_str(&status)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        })
    };
    decode().map(Some).map_err(DatabaseError::SqlError)
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| sqlx::Error::Decode(format!("invalid timestamp {ms}").into()))
}
