//! Geocoding enrichment.
//!
//! Records without coordinates are resolved through a Nominatim-compatible
//! service. When the service is disabled, times out twice, errors or finds
//! nothing, the static city table in [`fallback`] answers instead, so
//! enrichment never fails.

pub mod fallback;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::{Config, GEOCODING_ATTEMPTS, GEOCODING_MIN_INTERVAL, MAX_IN_FLIGHT_GEOCODES};
use crate::error_handling::InitializationError;
use crate::initialization::init_geocoding_client;
use crate::models::{Business, DataType, GeocodeQuality};
use crate::normalize::valid_coordinates;

pub use fallback::{city_coordinates, fallback_coordinates};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
struct Lookup {
    client: reqwest::Client,
    endpoint: String,
    min_interval: Duration,
    // Start of the most recent request, shared by clones
    last_request: Arc<Mutex<Option<Instant>>>,
}

/// Adds coordinates to records that lack them.
#[derive(Debug, Clone)]
pub struct GeocodingEnricher {
    lookup: Option<Lookup>,
}

impl GeocodingEnricher {
    /// An enricher that never calls out and answers from the city table.
    pub fn offline() -> Self {
        Self { lookup: None }
    }

    /// An enricher querying `endpoint` with `client`.
    ///
    /// Requests are spaced at least [`GEOCODING_MIN_INTERVAL`] apart.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            lookup: Some(Lookup {
                client,
                endpoint: endpoint.into(),
                min_interval: GEOCODING_MIN_INTERVAL,
                last_request: Arc::new(Mutex::new(None)),
            }),
        }
    }

    /// Overrides the minimum spacing between two geocoding requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        if let Some(lookup) = self.lookup.as_mut() {
            lookup.min_interval = interval;
        }
        self
    }

    /// Builds the enricher described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        if !config.geocoding_enabled {
            return Ok(Self::offline());
        }
        let client = init_geocoding_client(config)?;
        Ok(Self::new(client, config.geocoding_endpoint.clone()))
    }

    /// Returns the record with coordinates set.
    ///
    /// Records that already carry coordinates are returned unchanged. Raw
    /// records that gain coordinates are tagged as enriched.
    pub async fn enrich(&self, mut business: Business) -> Business {
        if business.has_coordinates() {
            return business;
        }

        let query = business
            .address
            .as_deref()
            .map(|a| format!("{a}, {}", business.location))
            .unwrap_or_else(|| business.location.clone());

        let resolved = match &self.lookup {
            Some(lookup) => lookup.resolve(&query).await,
            None => None,
        };

        let ((lat, lon), quality) = match resolved {
            Some(coords) => (coords, GeocodeQuality::Exact),
            None => fallback_coordinates(business.address.as_deref(), &business.location),
        };

        business.latitude = Some(lat);
        business.longitude = Some(lon);
        business.geocode_quality = Some(quality);
        if business.data_type == DataType::Raw {
            business.data_type = DataType::Enriched;
        }
        business
    }

    /// Enriches a batch with a small in-flight cap, keeping input order.
    ///
    /// Lookups still start no closer together than the minimum interval.
    pub async fn enrich_all(&self, records: Vec<Business>) -> Vec<Business> {
        stream::iter(records)
            .map(|record| self.enrich(record))
            .buffered(MAX_IN_FLIGHT_GEOCODES)
            .collect()
            .await
    }
}

impl Lookup {
    /// Resolves `query`, retrying once on timeout.
    async fn resolve(&self, query: &str) -> Option<(f64, f64)> {
        for attempt in 1..=GEOCODING_ATTEMPTS {
            match self.fetch(query).await {
                Ok(found) => return found,
                Err(e) if e.is_timeout() && attempt < GEOCODING_ATTEMPTS => {
                    log::debug!("Geocoding timed out for '{}', retrying", query);
                }
                Err(e) => {
                    log::warn!("Geocoding failed for '{}': {}", query, e);
                    return None;
                }
            }
        }
        None
    }

    /// Waits until the minimum interval since the previous request has passed.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }

    async fn fetch(&self, query: &str) -> Result<Option<(f64, f64)>, reqwest::Error> {
        self.throttle().await;
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(places.into_iter().next().and_then(|place| {
            let lat = place.lat.trim().parse::<f64>().ok();
            let lon = place.lon.trim().parse::<f64>().ok();
            valid_coordinates(lat, lon)
        }))
    }
}
