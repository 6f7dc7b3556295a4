//! Persistence store behavior against an on-disk database.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use lead_harvest::{LeadFilter, LeadStore, SessionStatus, SqliteLeadStore};

#[path = "helpers.rs"]
mod helpers;

use helpers::business;

async fn open_store(dir: &TempDir) -> SqliteLeadStore {
    SqliteLeadStore::open(&dir.path().join("data").join("businesses.db"))
        .await
        .expect("Failed to open store")
}

#[tokio::test]
async fn test_insert_twice_stores_once() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;
    let record = business("Leopold Cafe", "Mumbai", Some("Colaba Causeway"));

    let first = store.insert_batch(&[record.clone()]).await.expect("insert");
    let second = store.insert_batch(&[record]).await.expect("insert again");

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    assert_eq!(store.statistics().await.expect("stats").total_count, 1);
}

#[tokio::test]
async fn test_existing_rows_are_never_overwritten() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;
    let original = business("Leopold Cafe", "Mumbai", Some("Colaba Causeway"));
    let mut changed = original.clone();
    changed.contact = Some("9123456780".to_string());
    changed.source = "google_maps".to_string();

    store.insert_batch(&[original]).await.expect("insert");
    assert_eq!(store.insert_batch(&[changed]).await.expect("insert"), 0);

    let rows = store.query(&LeadFilter::default()).await.expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].contact.as_deref(), Some("9876543210"));
    assert_eq!(rows[0].source, "directoryA");
}

#[tokio::test]
async fn test_missing_address_is_part_of_the_key() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;

    let stored = store
        .insert_batch(&[
            business("Chai Point", "Bangalore", None),
            business("Chai Point", "Bangalore", None),
            business("Chai Point", "Bangalore", Some("Indiranagar")),
        ])
        .await
        .expect("insert");
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    {
        let store = open_store(&dir).await;
        store
            .insert_batch(&[business("Leopold Cafe", "Mumbai", Some("Colaba"))])
            .await
            .expect("insert");
        store.pool().close().await;
    }

    let store = open_store(&dir).await;
    let found = store.search("leopold").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].location, "Mumbai");
}

#[tokio::test]
async fn test_query_filters_and_date_range() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;

    let mut old = business("Old Bakery", "Pune", Some("FC Road"));
    old.scraped_at -= Duration::days(30);
    let mut gym = business("Iron Gym", "Pune", Some("Baner"));
    gym.category = Some("gyms".to_string());
    store
        .insert_batch(&[
            old,
            gym,
            business("Vaishali", "Pune", Some("FC Road")),
            business("Leopold Cafe", "Mumbai", Some("Colaba")),
        ])
        .await
        .expect("insert");

    let pune = store
        .query(&LeadFilter {
            location: Some("pun".to_string()),
            ..Default::default()
        })
        .await
        .expect("query");
    assert_eq!(pune.len(), 3);

    let today = Utc::now().date_naive();
    let recent_restaurants = store
        .query(&LeadFilter {
            location: Some("Pune".to_string()),
            category: Some("restaurant".to_string()),
            date_range: Some((today - Duration::days(1), today)),
        })
        .await
        .expect("query");
    let names: Vec<&str> = recent_restaurants.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Vaishali"]);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;

    let id = store.create_session("Jaipur").await.expect("create");
    let running = store.session(id).await.expect("load").expect("exists");
    assert_eq!(running.status, SessionStatus::Running);
    assert!(running.completed_at.is_none());

    store
        .update_session(id, 12, SessionStatus::CompletedWithErrors)
        .await
        .expect("update");
    let done = store.session(id).await.expect("load").expect("exists");
    assert_eq!(done.status, SessionStatus::CompletedWithErrors);
    assert_eq!(done.total_scraped, 12);
    assert!(done.duration_seconds() >= 0);

    assert!(store.session(id + 100).await.expect("load").is_none());
    assert!(store
        .update_session(id + 100, 0, SessionStatus::Completed)
        .await
        .is_err());
}
