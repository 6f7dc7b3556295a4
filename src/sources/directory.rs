//! Directory site adapter (JustDial).
//!
//! For each search term the adapter walks an ordered list of URL shapes until
//! one returns listing cards, then pulls further result pages of that shape
//! with a small in-flight cap.

use std::sync::LazyLock;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};

use crate::config::{
    DEFAULT_SEARCH_TERMS, MAX_IN_FLIGHT_REQUESTS, MAX_PAGES_PER_TERM, MAX_SEARCH_TERMS,
    RESULTS_PER_PAGE,
};
use crate::error_handling::SourceError;
use crate::models::RawCandidate;
use crate::utils::{first_attr, first_text, parse_selectors};

use super::http::{FetchSettings, SourceSession};
use super::{SearchOutcome, SearchQuery, SourceAdapter, JUSTDIAL};

// Listing containers, tried in order; the first that matches anything wins
static LISTING_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[
            ".resultbox",
            ".store-details",
            ".cont_sw_container",
            "[data-track=\"pwa_listing\"]",
        ],
        "directory listing",
    )
});

static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[
            ".resultbox_title_anchor",
            ".fn",
            ".store-name",
            ".jdMagicText",
            ".lng_cont_name",
            "h2",
            "h3",
        ],
        "directory name",
    )
});

static PHONE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[
            ".callcontent",
            ".contact-info",
            ".callNowFirst",
            ".phone",
            "[data-track=\"pwa_listing_cta_call\"]",
        ],
        "directory phone",
    )
});

static TEL_LINK_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| parse_selectors(&["a[href^=\"tel:\"]"], "directory tel link"));

static ADDRESS_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[
            ".resultbox_address",
            ".address",
            ".adr",
            ".cont_sw_addr",
            ".store-address",
        ],
        "directory address",
    )
});

static WEBSITE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(
        &[
            "[data-track=\"pwa_listing_cta_website\"]",
            "a.website",
            ".website a",
            "a[href*=\"website\"]",
        ],
        "directory website",
    )
});

/// Directory-site categories whose URL slug differs from the plain term.
const CATEGORY_SLUGS: &[(&str, &str)] = &[
    ("restaurants", "Restaurants"),
    ("it companies", "Software-Companies"),
    ("software companies", "Software-Companies"),
    ("hotels", "Hotels"),
    ("hospitals", "Hospitals"),
    ("schools", "Schools"),
    ("banks", "Banks"),
    ("grocery stores", "Grocery-Stores"),
    ("beauty parlours", "Beauty-Parlours"),
    ("car repair", "Car-Repair-Services"),
    ("plumbers", "Plumbers"),
    ("electricians", "Electricians"),
    ("shops", "General-Stores"),
    ("services", "Services"),
];

/// Adapter for a JustDial-style directory site.
pub struct DirectorySiteAdapter {
    base_url: String,
    mobile_base_url: Option<String>,
    settings: FetchSettings,
}

impl DirectorySiteAdapter {
    /// Creates the adapter. `mobile_base_url` adds the mobile site as a
    /// fallback URL shape.
    pub fn new(
        base_url: impl Into<String>,
        mobile_base_url: Option<String>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mobile_base_url: mobile_base_url.map(|u| u.trim_end_matches('/').to_string()),
            settings,
        }
    }

    /// URL shapes for one term, most productive first.
    fn search_urls(&self, term: &str, location: &str) -> Vec<String> {
        let city = title_case(location).replace(' ', "-");
        let slug = category_slug(term);
        let mut urls = vec![
            format!("{}/{}/{}", self.base_url, city, slug),
            format!("{}/{}/{}-near-me", self.base_url, city, slug),
        ];
        if let Some(mobile) = &self.mobile_base_url {
            urls.push(format!("{}/{}/{}", mobile, city, slug));
        }
        urls.push(format!(
            "{}/search-{}-{}",
            self.base_url,
            url_slug(term),
            url_slug(location)
        ));
        urls
    }

    async fn try_search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>, SourceError> {
        let session = SourceSession::open(JUSTDIAL, &self.settings)?;
        let terms = search_terms(query.category.as_deref());
        let mut candidates = Vec::new();
        let mut last_error = None;

        for term in &terms {
            if candidates.len() >= query.max_results {
                break;
            }
            let remaining = query.max_results - candidates.len();
            match self.search_term(&session, term, query, remaining).await {
                Ok(found) => candidates.extend(found),
                Err(e) => {
                    log::warn!("{}: term '{}' failed: {}", JUSTDIAL, term, e);
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

    /// Finds a working URL shape for `term` and collects up to `limit`
    /// candidates from it.
    async fn search_term(
        &self,
        session: &SourceSession<'_>,
        term: &str,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let mut last_error = None;

        for url in self.search_urls(term, &query.location) {
            log::debug!("{}: trying {}", JUSTDIAL, url);
            let html = match session.get_html(&url, &[]).await {
                Ok(html) => html,
                Err(e) => {
                    log::debug!("{}: {} failed: {}", JUSTDIAL, url, e);
                    last_error = Some(e);
                    continue;
                }
            };

            let mut found = parse_listings(&html, term);
            if found.is_empty() {
                log::debug!("{}: no listings at {}", JUSTDIAL, url);
                continue;
            }
            log::info!("{}: {} listing(s) at {}", JUSTDIAL, found.len(), url);

            if found.len() < limit {
                let extra_pages = pages_needed(limit - found.len());
                let more: Vec<Vec<RawCandidate>> = stream::iter(2..2 + extra_pages)
                    .map(|page| {
                        let page_url = format!("{}/page-{}", url, page);
                        async move {
                            match session.get_html(&page_url, &[]).await {
                                Ok(html) => parse_listings(&html, term),
                                Err(e) => {
                                    log::debug!("{}: {} failed: {}", JUSTDIAL, page_url, e);
                                    Vec::new()
                                }
                            }
                        }
                    })
                    .buffered(MAX_IN_FLIGHT_REQUESTS)
                    .collect()
                    .await;
                found.extend(more.into_iter().flatten());
            }

            found.truncate(limit);
            return Ok(found);
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl SourceAdapter for DirectorySiteAdapter {
    fn id(&self) -> &str {
        JUSTDIAL
    }

    async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome {
        if query.max_results == 0 {
            return SearchOutcome::found(Vec::new());
        }
        SearchOutcome::from_result(JUSTDIAL, self.try_search(query).await)
    }
}

/// Parses every listing card on a results page.
fn parse_listings(html: &str, term: &str) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let Some(cards) = LISTING_SELECTORS
        .iter()
        .map(|selector| document.select(selector).collect::<Vec<_>>())
        .find(|cards| !cards.is_empty())
    else {
        return Vec::new();
    };

    cards
        .into_iter()
        .map(|card| RawCandidate {
            name: first_text(card, &NAME_SELECTORS),
            contact: first_text(card, &PHONE_SELECTORS).or_else(|| {
                first_attr(card, &TEL_LINK_SELECTORS, "href")
                    .map(|href| href.trim_start_matches("tel:").to_string())
            }),
            address: first_text(card, &ADDRESS_SELECTORS),
            website: first_attr(card, &WEBSITE_SELECTORS, "href"),
            category: Some(term.to_string()),
            ..Default::default()
        })
        .filter(|candidate| candidate.name.is_some())
        .collect()
}

fn search_terms(category: Option<&str>) -> Vec<String> {
    match category {
        Some(category) => vec![category.to_string()],
        None => DEFAULT_SEARCH_TERMS
            .iter()
            .take(MAX_SEARCH_TERMS)
            .map(|t| t.to_string())
            .collect(),
    }
}

fn pages_needed(remaining: usize) -> usize {
    remaining
        .div_ceil(RESULTS_PER_PAGE)
        .min(MAX_PAGES_PER_TERM.saturating_sub(1))
}

fn category_slug(term: &str) -> String {
    let lowered = term.trim().to_lowercase();
    CATEGORY_SLUGS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, slug)| slug.to_string())
        .unwrap_or_else(|| title_case(&lowered).replace(' ', "-"))
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn url_slug(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.trim().as_bytes()).collect()
}
