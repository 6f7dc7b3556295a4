//! Quick, comprehensive and custom runs.
//!
//! All three are parameterizations of [`Orchestrator::run`].

use crate::config::{COMPREHENSIVE_MAX_RESULTS, QUICK_DEFAULT_SOURCES, QUICK_MAX_RESULTS};
use crate::error_handling::ScrapeError;

use super::{Orchestrator, RunSummary};

impl Orchestrator {
    /// Small run: 20 results per source, `justdial` unless sources are given.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::run`].
    pub async fn run_quick(
        &self,
        location: &str,
        category: Option<&str>,
        selected_sources: Option<&[String]>,
    ) -> Result<RunSummary, ScrapeError> {
        let sources: Vec<String> = match selected_sources {
            Some(selected) if !selected.is_empty() => selected.to_vec(),
            _ => QUICK_DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        };
        self.run(location, category, &sources, QUICK_MAX_RESULTS)
            .await
    }

    /// Large run: 50 results per source, every configured source unless
    /// sources are given.
    ///
    /// A source missing its credential is only scraped when named.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::run`].
    pub async fn run_comprehensive(
        &self,
        location: &str,
        category: Option<&str>,
        selected_sources: Option<&[String]>,
    ) -> Result<RunSummary, ScrapeError> {
        let sources = match selected_sources {
            Some(selected) if !selected.is_empty() => selected.to_vec(),
            _ => self.registry.configured_ids(),
        };
        self.run(location, category, &sources, COMPREHENSIVE_MAX_RESULTS)
            .await
    }

    /// Run with explicit sources and cap.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::run`].
    pub async fn run_custom<S: AsRef<str>>(
        &self,
        location: &str,
        category: Option<&str>,
        sources: &[S],
        max_results: usize,
    ) -> Result<RunSummary, ScrapeError> {
        self.run(location, category, sources, max_results).await
    }
}
