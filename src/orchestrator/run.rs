//! The orchestration loop.

use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;

use crate::dedupe::dedupe;
use crate::error_handling::ScrapeError;
use crate::models::{Business, SessionStatus};
use crate::normalize::{normalize_all, NormalizeContext};
use crate::sources::{SearchOutcome, SearchQuery, SourceAdapter};
use crate::utils::sanitize_and_truncate_error_message;

use super::{Orchestrator, ProbeResult, QualityReport, RunSummary, SourceOutcome};

/// Records of one source after normalize, dedupe, enrich and persist.
struct SourceBatch {
    candidates: usize,
    records: Vec<Business>,
    stored: usize,
    failure: Option<String>,
}

impl Orchestrator {
    /// Runs `sources` for `location` and `category`, persisting as it goes.
    ///
    /// Sources run sequentially in the given order. Unknown names and
    /// failing sources are reported in [`RunSummary::errors`] and never abort
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidArgument`] for a blank location, an
    /// empty source list or a zero cap, and [`ScrapeError::Persistence`] if
    /// the store fails.
    pub async fn run<S: AsRef<str>>(
        &self,
        location: &str,
        category: Option<&str>,
        sources: &[S],
        max_results: usize,
    ) -> Result<RunSummary, ScrapeError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ScrapeError::InvalidArgument(
                "location must not be empty".into(),
            ));
        }
        if sources.is_empty() {
            return Err(ScrapeError::InvalidArgument(
                "at least one source is required".into(),
            ));
        }
        if max_results == 0 {
            return Err(ScrapeError::InvalidArgument(
                "max_results must be greater than zero".into(),
            ));
        }

        let started_at = Utc::now();
        let query = SearchQuery::new(location, category, max_results);
        let resolved = self.registry.resolve(sources);
        let mut errors = resolved.errors;

        let session_id = self.store.create_session(location).await?;
        log::info!(
            "Session {} started: {} source(s) for {}{}",
            session_id,
            resolved.adapters.len(),
            location,
            query
                .category
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default()
        );

        let mut accumulated = Vec::new();
        let mut sources_scraped = Vec::with_capacity(resolved.adapters.len());
        let mut businesses_by_source = Vec::with_capacity(resolved.adapters.len());

        for (idx, adapter) in resolved.adapters.iter().enumerate() {
            if idx > 0 {
                self.settings.inter_source_delay.pause().await;
            }
            let source = adapter.id().to_string();
            log::info!("Scraping {} ...", source);

            let batch = self.scrape_source(adapter.as_ref(), &query).await?;
            match &batch.failure {
                Some(failure) => errors.push(format!("{source}: {failure}")),
                None if batch.candidates == 0 => {
                    errors.push(format!("{source}: no businesses found"))
                }
                None => {}
            }
            log::info!(
                "{}: {} valid record(s), {} new",
                source,
                batch.records.len(),
                batch.stored
            );

            businesses_by_source.push(SourceOutcome {
                source: source.clone(),
                found: batch.records.len(),
                stored: batch.stored,
            });
            sources_scraped.push(source);
            accumulated.extend(batch.records);
        }

        let businesses = dedupe(accumulated);
        let status = if errors.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::CompletedWithErrors
        };
        self.store
            .update_session(session_id, businesses.len(), status)
            .await?;
        let completed_at = Utc::now();

        let quality = QualityReport::from_records(&businesses);
        quality.log();
        for error in &errors {
            log::warn!("{}", error);
        }
        log::info!(
            "Session {} {}: {} unique business(es) from {} source(s) in {:.1}s",
            session_id,
            status,
            businesses.len(),
            sources_scraped.len(),
            (completed_at - started_at).num_milliseconds() as f64 / 1000.0
        );

        Ok(RunSummary {
            location: location.to_string(),
            category: query.category,
            total_businesses: businesses.len(),
            sources_scraped,
            businesses_by_source,
            errors,
            businesses,
            session_id,
            started_at,
            completed_at,
            quality,
        })
    }

    /// Invokes each registered source with a cap of one result.
    ///
    /// Nothing is normalized or persisted; the result only says which
    /// sources currently answer.
    pub async fn probe_sources(&self, location: &str) -> Vec<ProbeResult> {
        let query = SearchQuery::new(location.trim(), None, 1);
        let adapters = self.registry.resolve(self.registry.ids().as_slice()).adapters;
        let mut results = Vec::with_capacity(adapters.len());
        for (idx, adapter) in adapters.iter().enumerate() {
            if idx > 0 {
                self.settings.inter_source_delay.pause().await;
            }
            let outcome = self.search(adapter.as_ref(), &query).await;
            let working = !outcome.candidates.is_empty();
            if working {
                log::info!("Probe {}: working", adapter.id());
            } else {
                log::warn!(
                    "Probe {}: {}",
                    adapter.id(),
                    outcome.failure.as_deref().unwrap_or("no results")
                );
            }
            results.push(ProbeResult {
                source: adapter.id().to_string(),
                working,
                failure: outcome.failure,
            });
        }
        results
    }

    /// Search, normalize, dedupe, enrich and persist for one source.
    ///
    /// Only a store failure is returned as an error. Candidates rejected by
    /// validation are dropped without being reported.
    async fn scrape_source(
        &self,
        adapter: &dyn SourceAdapter,
        query: &SearchQuery,
    ) -> Result<SourceBatch, ScrapeError> {
        let outcome = self.search(adapter, query).await;

        let ctx = NormalizeContext {
            location: &query.location,
            category: query.category.as_deref(),
            source: adapter.id(),
        };
        let records = dedupe(normalize_all(&outcome.candidates, &ctx));
        let records = self.enricher.enrich_all(records).await;

        let stored = if records.is_empty() {
            0
        } else {
            self.store.insert_batch(&records).await.map_err(|e| {
                log::error!("{}: failed to persist batch: {}", adapter.id(), e);
                e
            })?
        };

        Ok(SourceBatch {
            candidates: outcome.candidates.len(),
            records,
            stored,
            failure: outcome.failure,
        })
    }

    /// Calls the adapter under the per-source deadline.
    ///
    /// A deadline overrun or a panic inside the adapter becomes a failed
    /// outcome.
    async fn search(&self, adapter: &dyn SourceAdapter, query: &SearchQuery) -> SearchOutcome {
        let call = AssertUnwindSafe(adapter.search_businesses(query)).catch_unwind();
        let result = match self.settings.source_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "{}: timed out after {}s",
                        adapter.id(),
                        limit.as_secs_f64()
                    );
                    return SearchOutcome::failed(format!(
                        "timed out after {}s",
                        limit.as_secs_f64()
                    ));
                }
            },
            None => call.await,
        };

        result.unwrap_or_else(|panic| {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("{}: adapter panicked: {}", adapter.id(), detail);
            SearchOutcome::failed(sanitize_and_truncate_error_message(&format!(
                "adapter panicked: {detail}"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::geocode::GeocodingEnricher;
    use crate::models::RawCandidate;
    use crate::orchestrator::RunSettings;
    use crate::sources::SourceRegistry;
    use crate::storage::{LeadStore, SqliteLeadStore};

    struct Fixed {
        id: &'static str,
        names: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(id: &'static str, names: Vec<&'static str>) -> Self {
            Self {
                id,
                names,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SearchOutcome::found(
                self.names
                    .iter()
                    .take(query.max_results)
                    .map(|name| RawCandidate {
                        name: Some((*name).to_string()),
                        address: Some(format!("{name} Road, Delhi")),
                        ..Default::default()
                    })
                    .collect(),
            )
        }
    }

    struct Slow;

    #[async_trait]
    impl SourceAdapter for Slow {
        fn id(&self) -> &str {
            "slow"
        }

        async fn search_businesses(&self, _query: &SearchQuery) -> SearchOutcome {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            SearchOutcome::default()
        }
    }

    struct Panicking;

    #[async_trait]
    impl SourceAdapter for Panicking {
        fn id(&self) -> &str {
            "panicking"
        }

        async fn search_businesses(&self, _query: &SearchQuery) -> SearchOutcome {
            panic!("selector blew up");
        }
    }

    async fn orchestrator(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        settings: RunSettings,
    ) -> Orchestrator {
        let mut registry = SourceRegistry::new();
        for adapter in adapters {
            registry.register(adapter);
        }
        let store = SqliteLeadStore::open_in_memory().await.expect("store");
        Orchestrator::new(
            Arc::new(store),
            registry,
            GeocodingEnricher::offline(),
            settings,
        )
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let orch = orchestrator(vec![], RunSettings::immediate()).await;
        let empty: [&str; 0] = [];
        assert!(matches!(
            orch.run("Delhi", None, &empty, 5).await,
            Err(ScrapeError::InvalidArgument(_))
        ));
        assert!(matches!(
            orch.run("  ", None, &["x"], 5).await,
            Err(ScrapeError::InvalidArgument(_))
        ));
        assert!(matches!(
            orch.run("Delhi", None, &["x"], 0).await,
            Err(ScrapeError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_global_dedupe_prefers_earlier_source() {
        let orch = orchestrator(
            vec![
                Arc::new(Fixed::new("first", vec!["Cafe", "Bakery"])),
                Arc::new(Fixed::new("second", vec!["Cafe", "Florist"])),
            ],
            RunSettings::immediate(),
        )
        .await;

        let summary = orch
            .run("Delhi", Some("shops"), &["first", "second"], 10)
            .await
            .expect("run");
        assert_eq!(summary.total_businesses, 3);
        assert_eq!(summary.sources_scraped, vec!["first", "second"]);
        let cafe = summary
            .businesses
            .iter()
            .find(|b| b.name == "Cafe")
            .expect("cafe");
        assert_eq!(cafe.source, "first");
        // The second source's Cafe has the same storage key
        assert_eq!(summary.stored_total(), 3);
        assert!(summary.is_clean());

        let session = orch
            .store()
            .session(summary.session_id)
            .await
            .expect("load")
            .expect("session");
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.total_scraped, 3);
    }

    #[tokio::test]
    async fn test_records_are_enriched_before_persisting() {
        let orch = orchestrator(
            vec![Arc::new(Fixed::new("only", vec!["Cafe"]))],
            RunSettings::immediate(),
        )
        .await;
        let summary = orch.run("Delhi", None, &["only"], 5).await.expect("run");
        let record = &summary.businesses[0];
        assert_eq!(record.latitude, Some(28.6139));
        assert_eq!(summary.quality.with_coordinates, 1);
        assert_eq!(summary.quality.approximate_coordinates, 1);
    }

    #[tokio::test]
    async fn test_source_timeout_is_reported() {
        let settings = RunSettings {
            source_timeout: Some(Duration::from_millis(20)),
            ..RunSettings::immediate()
        };
        let orch = orchestrator(
            vec![Arc::new(Slow), Arc::new(Fixed::new("fast", vec!["Cafe"]))],
            settings,
        )
        .await;
        let summary = orch
            .run("Delhi", None, &["slow", "fast"], 5)
            .await
            .expect("run");
        assert_eq!(summary.total_businesses, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("slow: timed out"), "{:?}", summary.errors);
    }

    #[tokio::test]
    async fn test_panicking_adapter_does_not_abort_run() {
        let orch = orchestrator(
            vec![
                Arc::new(Panicking),
                Arc::new(Fixed::new("fine", vec!["Cafe"])),
            ],
            RunSettings::immediate(),
        )
        .await;
        let summary = orch
            .run("Delhi", None, &["panicking", "fine"], 5)
            .await
            .expect("run");
        assert_eq!(summary.total_businesses, 1);
        assert_eq!(
            summary.errors,
            vec!["panicking: adapter panicked: selector blew up".to_string()]
        );
    }

    #[tokio::test]
    async fn test_probe_uses_cap_of_one_and_persists_nothing() {
        let fixed = Arc::new(Fixed::new("fixed", vec!["Cafe", "Bakery"]));
        let orch = orchestrator(
            vec![fixed.clone(), Arc::new(Fixed::new("empty", vec![]))],
            RunSettings::immediate(),
        )
        .await;

        let results = orch.probe_sources("Delhi").await;
        assert_eq!(results.len(), 2);
        assert!(results[0].working);
        assert!(!results[1].working);
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            orch.store().statistics().await.expect("stats").total_count,
            0
        );
    }
}
