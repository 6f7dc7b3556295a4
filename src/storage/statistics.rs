//! Aggregate statistics over stored businesses.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;

/// Number of locations reported in [`StoreStatistics::top_locations`].
const TOP_LOCATIONS: i64 = 10;
/// Days covered by [`StoreStatistics::recent_activity`].
const RECENT_DAYS: i64 = 7;

/// Record count for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    /// Location as stored
    pub location: String,
    /// Records for that location
    pub count: i64,
}

/// Records scraped on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// UTC day
    pub date: NaiveDate,
    /// Records scraped that day
    pub count: i64,
}

/// Store-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatistics {
    /// Records in the store
    pub total_count: i64,
    /// Up to ten locations, most records first
    pub top_locations: Vec<LocationCount>,
    /// Last seven days with activity, newest first
    pub recent_activity: Vec<DailyCount>,
}

/// Computes totals, top locations and the last week's daily counts.
pub async fn statistics(pool: &SqlitePool) -> Result<StoreStatistics, DatabaseError> {
    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM businesses")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::SqlError)?;

    let top_locations = sqlx::query(
        "SELECT location, COUNT(*) AS count FROM businesses
         GROUP BY location ORDER BY count DESC, location ASC LIMIT ?",
    )
    .bind(TOP_LOCATIONS)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::SqlError)?
    .iter()
    .map(|row| -> Result<LocationCount, sqlx::Error> {
        Ok(LocationCount {
            location: row.try_get("location")?,
            count: row.try_get("count")?,
        })
    })
    .collect::<Result<Vec<_>, sqlx::Error>>()
    .map_err(DatabaseError::SqlError)?;

    let since_ms = (Utc::now() - Duration::days(RECENT_DAYS)).timestamp_millis();
    let recent_activity = sqlx::query(
        "SELECT date(scraped_at_ms / 1000, 'unixepoch') AS day, COUNT(*) AS count
         FROM businesses WHERE scraped_at_ms >= ?
         GROUP BY day ORDER BY day DESC",
    )
    .bind(since_ms)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::SqlError)?
    .iter()
    .map(|row| -> Result<DailyCount, sqlx::Error> {
        let day: String = row.try_get("day")?;
        let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(DailyCount {
            date,
            count: row.try_get("count")?,
        })
    })
    .collect::<Result<Vec<_>, sqlx::Error>>()
    .map_err(DatabaseError::SqlError)?;

    Ok(StoreStatistics {
        total_count,
        top_locations,
        recent_activity,
    })
}
