//! Maps API adapter (Google Places).
//!
//! A text search yields place ids; a details lookup per place fills in phone
//! and website. Without an API key the adapter answers immediately with a
//! missing-credential outcome and touches no network.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::config::{MAPS_MAX_PAGES, MAPS_PAGE_TOKEN_DELAY, MAX_IN_FLIGHT_REQUESTS};
use crate::error_handling::SourceError;
use crate::models::RawCandidate;

use super::http::{FetchSettings, SourceSession};
use super::{describe_source_error, SearchOutcome, SearchQuery, SourceAdapter, GOOGLE_MAPS};

const API_KEY_NAME: &str = "GOOGLE_MAPS_API_KEY";
const DETAIL_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,geometry";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<Place>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<Place>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Place {
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl Place {
    /// Fills gaps in `self` from the text-search entry.
    fn or(self, fallback: &Place) -> Place {
        Place {
            place_id: self.place_id.or_else(|| fallback.place_id.clone()),
            name: self.name.or_else(|| fallback.name.clone()),
            formatted_address: self
                .formatted_address
                .or_else(|| fallback.formatted_address.clone()),
            formatted_phone_number: self
                .formatted_phone_number
                .or_else(|| fallback.formatted_phone_number.clone()),
            website: self.website.or_else(|| fallback.website.clone()),
            geometry: self.geometry.or_else(|| fallback.geometry.clone()),
        }
    }

    fn into_candidate(self, query: &SearchQuery) -> RawCandidate {
        let coords = self.geometry.map(|g| g.location);
        RawCandidate {
            name: self.name,
            contact: self.formatted_phone_number,
            address: self.formatted_address,
            website: self.website,
            category: query.category.clone(),
            location: None,
            latitude: coords.map(|c| c.lat),
            longitude: coords.map(|c| c.lng),
            verified: true,
        }
    }
}

/// Adapter for the Google Places web API.
pub struct MapsApiAdapter {
    base_url: String,
    api_key: Option<String>,
    settings: FetchSettings,
    page_token_delay: Duration,
}

impl MapsApiAdapter {
    /// Creates the adapter. A blank key counts as missing.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, settings: FetchSettings) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            settings,
            page_token_delay: MAPS_PAGE_TOKEN_DELAY,
        }
    }

    /// Overrides the wait before a `next_page_token` is redeemed.
    pub fn with_page_token_delay(mut self, delay: Duration) -> Self {
        self.page_token_delay = delay;
        self
    }

    /// Collects text-search results, following `next_page_token` until the
    /// cap is met, the token runs out or [`MAPS_MAX_PAGES`] pages were read.
    ///
    /// A failing first page is an error; a failing later page ends paging.
    async fn text_search(
        &self,
        session: &SourceSession<'_>,
        api_key: &str,
        query: &SearchQuery,
    ) -> Result<Vec<Place>, SourceError> {
        let url = format!("{}/textsearch/json", self.base_url);
        let text = match &query.category {
            Some(category) => format!("{} in {}", category, query.location),
            None => format!("businesses in {}", query.location),
        };

        let first: TextSearchResponse = session
            .get_json(
                &url,
                &[
                    ("query", text.as_str()),
                    ("key", api_key),
                    ("type", "establishment"),
                ],
            )
            .await?;
        match first.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            status => {
                let detail = first.error_message.unwrap_or_default();
                return Err(SourceError::Api(format!("{} {}", status, detail).trim().to_string()));
            }
        }

        let mut places = first.results;
        let mut token = first.next_page_token;
        let mut pages = 1;
        while places.len() < query.max_results && pages < MAPS_MAX_PAGES {
            let Some(page_token) = token.take() else {
                break;
            };
            tokio::time::sleep(self.page_token_delay).await;
            let page: Result<TextSearchResponse, SourceError> = session
                .get_json(&url, &[("pagetoken", page_token.as_str()), ("key", api_key)])
                .await;
            match page {
                Ok(page) if page.status == "OK" => {
                    places.extend(page.results);
                    token = page.next_page_token;
                    pages += 1;
                }
                Ok(page) => {
                    log::debug!("{}: page {} returned {}", GOOGLE_MAPS, pages + 1, page.status);
                    break;
                }
                Err(e) => {
                    log::debug!(
                        "{}: page {} failed: {}",
                        GOOGLE_MAPS,
                        pages + 1,
                        describe_source_error(&e)
                    );
                    break;
                }
            }
        }

        places.truncate(query.max_results);
        Ok(places)
    }

    async fn try_search(
        &self,
        api_key: &str,
        query: &SearchQuery,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let session = SourceSession::open(GOOGLE_MAPS, &self.settings)?;
        let places = self.text_search(&session, api_key, query).await?;
        let details_url = format!("{}/details/json", self.base_url);

        let candidates = stream::iter(places)
            .map(|place| {
                let session = &session;
                let details_url = details_url.as_str();
                async move {
                    let detailed = match place.place_id.as_deref() {
                        Some(place_id) => {
                            fetch_details(session, details_url, api_key, place_id).await
                        }
                        None => None,
                    };
                    match detailed {
                        Some(details) => details.or(&place),
                        None => place,
                    }
                }
            })
            .buffered(MAX_IN_FLIGHT_REQUESTS)
            .map(|place| place.into_candidate(query))
            .collect::<Vec<_>>()
            .await;

        Ok(candidates)
    }
}

/// Looks up one place; failures fall back to the text-search entry.
async fn fetch_details(
    session: &SourceSession<'_>,
    details_url: &str,
    api_key: &str,
    place_id: &str,
) -> Option<Place> {
    let response: Result<DetailsResponse, SourceError> = session
        .get_json(
            details_url,
            &[
                ("place_id", place_id),
                ("key", api_key),
                ("fields", DETAIL_FIELDS),
            ],
        )
        .await;

    match response {
        Ok(details) if details.status == "OK" => details.result,
        Ok(details) => {
            log::debug!(
                "{}: details for {} returned {}",
                GOOGLE_MAPS,
                place_id,
                details.status
            );
            None
        }
        Err(e) => {
            log::debug!(
                "{}: details for {} failed: {}",
                GOOGLE_MAPS,
                place_id,
                describe_source_error(&e)
            );
            None
        }
    }
}

#[async_trait]
impl SourceAdapter for MapsApiAdapter {
    fn id(&self) -> &str {
        GOOGLE_MAPS
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search_businesses(&self, query: &SearchQuery) -> SearchOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            log::warn!("{}: {} not configured, skipping", GOOGLE_MAPS, API_KEY_NAME);
            return SearchOutcome::failed(describe_source_error(&SourceError::MissingCredential(
                API_KEY_NAME,
            )));
        };
        if query.max_results == 0 {
            return SearchOutcome::found(Vec::new());
        }
        SearchOutcome::from_result(GOOGLE_MAPS, self.try_search(api_key, query).await)
    }
}
