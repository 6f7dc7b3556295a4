//! Source adapters.
//!
//! Every external source sits behind [`SourceAdapter`]. An adapter never
//! returns an error: failures are logged and folded into the
//! [`SearchOutcome`] so one source can never abort a run.
//!
//! Adapters are collected in a [`SourceRegistry`] keyed by canonical id.
//! User-supplied names go through [`canonical_source_id`] once, at run start.

mod directory;
mod generic;
mod http;
mod maps_api;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error_handling::{categorize_source_error, SourceError};
use crate::models::RawCandidate;
use crate::utils::sanitize_and_truncate_error_message;

pub use directory::DirectorySiteAdapter;
pub use generic::GenericDirectoryAdapter;
pub use http::FetchSettings;
pub use maps_api::MapsApiAdapter;

/// Canonical id of the directory site adapter.
pub const JUSTDIAL: &str = "justdial";
/// Canonical id of the maps API adapter.
pub const GOOGLE_MAPS: &str = "google_maps";
/// Canonical id of the generic directory adapter.
pub const LOCAL_DIRECTORIES: &str = "local_directories";

const ALIASES: &[(&str, &str)] = &[
    ("justdial", JUSTDIAL),
    ("justdial_real", JUSTDIAL),
    ("directory", JUSTDIAL),
    ("google_maps", GOOGLE_MAPS),
    ("google_maps_api", GOOGLE_MAPS),
    ("googlemaps", GOOGLE_MAPS),
    ("googlemaps_real", GOOGLE_MAPS),
    ("maps", GOOGLE_MAPS),
    ("maps_api", GOOGLE_MAPS),
    ("local_directories", LOCAL_DIRECTORIES),
    ("yellowpages", LOCAL_DIRECTORIES),
    ("yellow_pages", LOCAL_DIRECTORIES),
    ("generic_directory", LOCAL_DIRECTORIES),
];

/// Maps a user-supplied source name to its canonical id.
///
/// Alias matching ignores case and surrounding whitespace. Names outside the
/// alias table are returned trimmed but otherwise verbatim.
pub fn canonical_source_id(name: &str) -> String {
    let trimmed = name.trim();
    let lowered = trimmed.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// What the orchestrator asks a source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// City or area
    pub location: String,
    /// Category; `None` lets the adapter use its default terms
    pub category: Option<String>,
    /// Cap on returned candidates
    pub max_results: usize,
}

impl SearchQuery {
    /// Builds a query, treating a blank category as absent.
    pub fn new(location: impl Into<String>, category: Option<&str>, max_results: usize) -> Self {
        Self {
            location: location.into(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            max_results,
        }
    }
}

/// Result of one adapter call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Candidates found, possibly empty
    pub candidates: Vec<RawCandidate>,
    /// One-line description of why the search failed, if it did
    pub failure: Option<String>,
}

impl SearchOutcome {
    /// A successful search.
    pub fn found(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates,
            failure: None,
        }
    }

    /// A failed search with no candidates.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            failure: Some(message.into()),
        }
    }

    /// Folds an adapter-internal result into an outcome, logging the error.
    pub(crate) fn from_result(source: &str, result: Result<Vec<RawCandidate>, SourceError>) -> Self {
        match result {
            Ok(candidates) => {
                log::info!("{}: found {} candidate(s)", source, candidates.len());
                Self::found(candidates)
            }
            Err(e) => {
                let message = describe_source_error(&e);
                log::warn!("{}: {}", source, message);
                Self::failed(message)
            }
        }
    }
}

/// One-line, sanitized description of a source error.
pub(crate) fn describe_source_error(error: &SourceError) -> String {
    sanitize_and_truncate_error_message(&format!(
        "{}: {}",
        categorize_source_error(error),
        error
    ))
}

/// A searchable external source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Canonical id, also stamped on every record the adapter produces.
    fn id(&self) -> &str;

    /// Searches the source. Never fails; see [`SearchOutcome`].
    async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome;

    /// Whether the adapter has what it needs to search, such as a credential.
    ///
    /// Unconfigured adapters are left out of default source lists but still
    /// answer when named explicitly.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Adapters keyed by canonical id, in registration order.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

/// Outcome of resolving user-supplied source names.
#[derive(Clone, Default)]
pub struct ResolvedSources {
    /// Adapters to run, in request order, each at most once
    pub adapters: Vec<Arc<dyn SourceAdapter>>,
    /// One message per name that did not resolve
    pub errors: Vec<String>,
}

impl SourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the adapters enabled in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an enabled source name is not a known adapter.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = FetchSettings::from_config(config);
        let mut registry = Self::new();
        for name in &config.enabled_sources {
            match canonical_source_id(name).as_str() {
                JUSTDIAL => registry.register(Arc::new(DirectorySiteAdapter::new(
                    config.directory_base_url.clone(),
                    config.directory_mobile_base_url.clone(),
                    settings.clone(),
                ))),
                GOOGLE_MAPS => registry.register(Arc::new(MapsApiAdapter::new(
                    config.maps_base_url.clone(),
                    config.maps_api_key.clone(),
                    settings.clone(),
                ))),
                LOCAL_DIRECTORIES => registry.register(Arc::new(GenericDirectoryAdapter::new(
                    config.local_directories.clone(),
                    settings.clone(),
                ))),
                other => anyhow::bail!("Unknown source in configuration: {}", other),
            }
        }
        Ok(registry)
    }

    /// Adds an adapter, replacing any adapter with the same id.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        match self.adapters.iter().position(|a| a.id() == adapter.id()) {
            Some(idx) => self.adapters[idx] = adapter,
            None => self.adapters.push(adapter),
        }
    }

    /// Looks up an adapter by canonical id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.id() == id).cloned()
    }

    /// Canonical ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.id().to_string()).collect()
    }

    /// Canonical ids of the configured adapters, in registration order.
    pub fn configured_ids(&self) -> Vec<String> {
        self.adapters
            .iter()
            .filter(|a| a.is_configured())
            .map(|a| a.id().to_string())
            .collect()
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Resolves user-supplied names to adapters.
    ///
    /// Unknown names produce an `Unknown source: <name>` error. Names that
    /// resolve to an already selected adapter are skipped.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> ResolvedSources {
        let mut resolved = ResolvedSources::default();
        let mut seen = HashSet::new();
        for name in names {
            let name = name.as_ref();
            let canonical = canonical_source_id(name);
            match self.get(&canonical) {
                Some(adapter) => {
                    if seen.insert(canonical.clone()) {
                        resolved.adapters.push(adapter);
                    } else {
                        log::debug!("Source '{}' already selected as '{}'", name, canonical);
                    }
                }
                None => {
                    log::warn!("Unknown source: {}", name);
                    resolved.errors.push(format!("Unknown source: {}", name));
                }
            }
        }
        resolved
    }
}
