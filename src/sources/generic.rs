//! Generic directory adapter.
//!
//! Queries each configured directory endpoint with `(terms, location)` query
//! parameters and parses listings with generic selectors. The result cap is
//! split evenly across endpoints.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::config::DirectoryEndpoint;
use crate::error_handling::SourceError;
use crate::models::RawCandidate;
use crate::utils::{first_attr, first_text, parse_selectors};

use super::http::{FetchSettings, SourceSession};
use super::{SearchOutcome, SearchQuery, SourceAdapter, LOCAL_DIRECTORIES};

static LISTING_SELECTOR: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[".result, .listing, .business-card, .srp-listing"],
        "generic listing",
    )
});
static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[".business-name", ".name", "h3", "h4"], "generic name")
});
static PHONE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[".phone", ".phones", ".contact"], "generic phone")
});
static TEL_LINK_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| parse_selectors(&["a[href^=\"tel:\"]"], "generic tel link"));
static ADDRESS_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[".address", ".adr", ".street-address", ".addr", ".location"],
        "generic address",
    )
});
static WEBSITE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &["a.track-visit-website", "a.website", ".website a"],
        "generic website",
    )
});

/// Adapter over a list of Yellow-Pages-style directories.
pub struct GenericDirectoryAdapter {
    endpoints: Vec<DirectoryEndpoint>,
    settings: FetchSettings,
}

impl GenericDirectoryAdapter {
    /// Creates the adapter.
    pub fn new(endpoints: Vec<DirectoryEndpoint>, settings: FetchSettings) -> Self {
        Self {
            endpoints,
            settings,
        }
    }

    async fn try_search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>, SourceError> {
        let session = SourceSession::open(LOCAL_DIRECTORIES, &self.settings)?;
        let per_endpoint = (query.max_results / self.endpoints.len()).max(1);
        let terms = query.category.as_deref().unwrap_or("business");

        let mut candidates = Vec::new();
        let mut last_error = None;
        for endpoint in &self.endpoints {
            let params = [
                (endpoint.terms_param.as_str(), terms),
                (endpoint.location_param.as_str(), query.location.as_str()),
            ];
            match session.get_html(&endpoint.search_url, &params).await {
                Ok(html) => {
                    let mut found = parse_listings(&html, query.category.as_deref());
                    found.truncate(per_endpoint);
                    log::info!(
                        "{}: {} listing(s) from {}",
                        LOCAL_DIRECTORIES,
                        found.len(),
                        endpoint.label
                    );
                    candidates.extend(found);
                }
                Err(e) => {
                    log::warn!("{}: {} failed: {}", LOCAL_DIRECTORIES, endpoint.label, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if candidates.is_empty() => Err(e),
            _ => {
                candidates.truncate(query.max_results);
                Ok(candidates)
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for GenericDirectoryAdapter {
    fn id(&self) -> &str {
        LOCAL_DIRECTORIES
    }

    async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome {
        if self.endpoints.is_empty() || query.max_results == 0 {
            return SearchOutcome::found(Vec::new());
        }
        SearchOutcome::from_result(LOCAL_DIRECTORIES, self.try_search(query).await)
    }
}

fn parse_listings(html: &str, category: Option<&str>) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    LISTING_SELECTOR
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(|listing| RawCandidate {
            name: first_text(listing, &NAME_SELECTORS),
            contact: first_text(listing, &PHONE_SELECTORS).or_else(|| {
                first_attr(listing, &TEL_LINK_SELECTORS, "href")
                    .map(|href| href.trim_start_matches("tel:").to_string())
            }),
            address: first_text(listing, &ADDRESS_SELECTORS),
            website: first_attr(listing, &WEBSITE_SELECTORS, "href"),
            category: category.map(str::to_string),
            ..Default::default()
        })
        .filter(|candidate| candidate.name.is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generic_listings() {
        let html = r#"
            <div class="result">
              <a class="business-name">Joe's Pizza</a>
              <div class="phones">(212) 555-0147</div>
              <div class="street-address">7 Carmine St</div>
              <a class="track-visit-website" href="https://joespizza.example.com">Website</a>
            </div>
            <div class="listing"><h3>Corner Deli</h3></div>
            <div class="business-card"><span>nameless</span></div>
        "#;
        let candidates = parse_listings(html, Some("pizza"));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name.as_deref(), Some("Joe's Pizza"));
        assert_eq!(candidates[0].contact.as_deref(), Some("(212) 555-0147"));
        assert_eq!(candidates[0].address.as_deref(), Some("7 Carmine St"));
        assert_eq!(
            candidates[0].website.as_deref(),
            Some("https://joespizza.example.com")
        );
        assert_eq!(candidates[1].name.as_deref(), Some("Corner Deli"));
        assert_eq!(candidates[1].category.as_deref(), Some("pizza"));
    }
}
