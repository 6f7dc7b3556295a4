//! Business record persistence.
//!
//! Inserts are idempotent: the `(name, address, location)` key is enforced by
//! the schema and conflicting rows are ignored, never overwritten.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::models::{Business, DataType, GeocodeQuality};

use super::LeadFilter;

const SELECT_COLUMNS: &str = "SELECT name, location, category, address, contact, website, \
     latitude, longitude, geocode_quality, source, data_type, scraped_at_ms FROM businesses";

/// Inserts a batch in one transaction and returns how many rows were new.
pub async fn insert_batch(pool: &SqlitePool, records: &[Business]) -> Result<usize, DatabaseError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.map_err(DatabaseError::SqlError)?;
    let mut stored = 0u64;
    for record in records {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO businesses (
                name, location, category, address, contact, website,
                latitude, longitude, geocode_quality, source, data_type, scraped_at_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.location)
        .bind(record.category.as_deref())
        .bind(record.address.as_deref().unwrap_or_default())
        .bind(record.contact.as_deref())
        .bind(record.website.as_deref())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.geocode_quality.map(|q| q.to_string()))
        .bind(&record.source)
        .bind(record.data_type.to_string())
        .bind(record.scraped_at.timestamp_millis())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::SqlError)?;
        stored += result.rows_affected();
    }
    tx.commit().await.map_err(DatabaseError::SqlError)?;

    log::debug!("Stored {} of {} records", stored, records.len());
    Ok(stored as usize)
}

/// Records matching every set field of `filter`, newest first.
pub async fn query(pool: &SqlitePool, filter: &LeadFilter) -> Result<Vec<Business>, DatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    builder.push(" WHERE 1=1");

    if let Some(location) = filter.location.as_deref().filter(|l| !l.trim().is_empty()) {
        builder.push(" AND location LIKE ");
        builder.push_bind(contains_pattern(location));
        builder.push(" ESCAPE '\\'");
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.trim().is_empty()) {
        builder.push(" AND category LIKE ");
        builder.push_bind(contains_pattern(category));
        builder.push(" ESCAPE '\\'");
    }
    if let Some((start, end)) = filter.date_range {
        builder.push(" AND date(scraped_at_ms / 1000, 'unixepoch') >= ");
        builder.push_bind(day_string(start));
        builder.push(" AND date(scraped_at_ms / 1000, 'unixepoch') <= ");
        builder.push_bind(day_string(end));
    }
    builder.push(" ORDER BY scraped_at_ms DESC, id DESC");

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::SqlError)?;
    rows.iter()
        .map(business_from_row)
        .collect::<Result<_, _>>()
        .map_err(DatabaseError::SqlError)
}

/// Records whose name, address or category contains `term`, newest first.
pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Business>, DatabaseError> {
    let pattern = contains_pattern(term);
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE name LIKE ?1 ESCAPE '\\' OR address LIKE ?1 ESCAPE '\\' \
         OR category LIKE ?1 ESCAPE '\\' ORDER BY scraped_at_ms DESC, id DESC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::SqlError)?;
    rows.iter()
        .map(business_from_row)
        .collect::<Result<_, _>>()
        .map_err(DatabaseError::SqlError)
}

/// `LIKE` pattern matching `text` literally anywhere, for use with `ESCAPE '\'`.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn day_string(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn business_from_row(row: &SqliteRow) -> Result<Business, sqlx::Error> {
    let address: String = row.try_get("address")?;
    let scraped_at_ms: i64 = row.try_get("scraped_at_ms")?;
    let data_type: String = row.try_get("data_type")?;
    let geocode_quality: Option<String> = row.try_get("geocode_quality")?;

    Ok(Business {
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        category: row.try_get("category")?,
        address: (!address.is_empty()).then_some(address),
        contact: row.try_get("contact")?,
        website: row.try_get("website")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        geocode_quality: geocode_quality
            .map(|q| GeocodeQuality::from_str(&q))
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        source: row.try_get("source")?,
        scraped_at: DateTime::<Utc>::from_timestamp_millis(scraped_at_ms).ok_or_else(|| {
            sqlx::Error::Decode(format!("invalid timestamp {scraped_at_ms}").into())
        })?,
        data_type: DataType::from_str(&data_type).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{create_test_pool, sample_business};
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let pool = create_test_pool().await;
        let record = sample_business("Sharma Sweets", "Delhi", Some("Chandni Chowk"));

        assert_eq!(insert_batch(&pool, &[record.clone()]).await.expect("first"), 1);
        assert_eq!(insert_batch(&pool, &[record]).await.expect("second"), 0);

        let all = query(&pool, &LeadFilter::default()).await.expect("query");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_ignored_not_overwritten() {
        let pool = create_test_pool().await;
        let original = sample_business("Cafe", "Pune", Some("FC Road"));
        let mut changed = original.clone();
        changed.contact = Some("9999999999".into());

        insert_batch(&pool, &[original.clone()]).await.expect("insert");
        insert_batch(&pool, &[changed]).await.expect("insert");

        let stored = query(&pool, &LeadFilter::default()).await.expect("query");
        assert_eq!(stored[0].contact, original.contact);
    }

    #[tokio::test]
    async fn test_missing_address_round_trips_and_dedupes() {
        let pool = create_test_pool().await;
        let record = sample_business("Cafe", "Pune", None);
        assert_eq!(
            insert_batch(&pool, &[record.clone(), record]).await.expect("insert"),
            1
        );
        let stored = query(&pool, &LeadFilter::default()).await.expect("query");
        assert!(stored[0].address.is_none());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let pool = create_test_pool().await;
        let mut record = sample_business("Cafe", "Pune", Some("FC Road"));
        record.latitude = Some(18.5204);
        record.longitude = Some(73.8567);
        record.geocode_quality = Some(GeocodeQuality::CityApproximate);
        record.data_type = DataType::Enriched;
        insert_batch(&pool, &[record.clone()]).await.expect("insert");

        let stored = query(&pool, &LeadFilter::default()).await.expect("query");
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn test_query_filters() {
        let pool = create_test_pool().await;
        let mut old = sample_business("Old Cafe", "New Delhi", Some("CP"));
        old.scraped_at = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut shop = sample_business("Shop", "Mumbai", Some("Bandra"));
        shop.category = Some("shops".into());
        shop.scraped_at = Utc.with_ymd_and_hms(2024, 1, 12, 12, 0, 0).unwrap();
        let mut newest = sample_business("New Cafe", "Delhi", Some("Saket"));
        newest.scraped_at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        insert_batch(&pool, &[old, shop, newest]).await.expect("insert");

        let delhi = query(
            &pool,
            &LeadFilter {
                location: Some("delhi".into()),
                ..Default::default()
            },
        )
        .await
        .expect("query");
        let names: Vec<&str> = delhi.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["New Cafe", "Old Cafe"]);

        let shops = query(
            &pool,
            &LeadFilter {
                category: Some("shop".into()),
                ..Default::default()
            },
        )
        .await
        .expect("query");
        assert_eq!(shops.len(), 1);

        let window = query(
            &pool,
            &LeadFilter {
                date_range: Some((
                    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
                )),
                ..Default::default()
            },
        )
        .await
        .expect("query");
        let names: Vec<&str> = window.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Shop", "Old Cafe"]);
    }

    #[tokio::test]
    async fn test_search_matches_name_address_category() {
        let pool = create_test_pool().await;
        let mut a = sample_business("Blue Tokai", "Delhi", Some("Champa Gali"));
        a.category = Some("coffee".into());
        a.scraped_at = Utc::now() - Duration::minutes(2);
        let b = sample_business("Gupta Store", "Delhi", Some("Blue Lane"));
        let c = sample_business("Unrelated", "Delhi", Some("Elsewhere"));
        insert_batch(&pool, &[a, b, c]).await.expect("insert");

        let found = search(&pool, "blue").await.expect("search");
        let names: Vec<&str> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Gupta Store", "Blue Tokai"]);

        assert_eq!(search(&pool, "coffee").await.expect("search").len(), 1);
    }

    #[tokio::test]
    async fn test_wildcards_in_filters_match_literally() {
        let pool = create_test_pool().await;
        let mut discount = sample_business("100% Pure Juice", "Delhi", Some("Lajpat Nagar"));
        discount.category = Some("juice_bar".into());
        let mut plain = sample_business("1000 Pure Juices", "Delhi", Some("Karol Bagh"));
        plain.category = Some("juiceXbar".into());
        insert_batch(&pool, &[discount, plain]).await.expect("insert");

        let found = search(&pool, "100%").await.expect("search");
        let names: Vec<&str> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["100% Pure Juice"]);

        let bars = query(
            &pool,
            &LeadFilter {
                category: Some("juice_bar".into()),
                ..Default::default()
            },
        )
        .await
        .expect("query");
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].name, "100% Pure Juice");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" 50%_off "), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
