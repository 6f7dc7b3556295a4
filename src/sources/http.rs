//! Scoped network session shared by the HTTP adapters.
//!
//! A [`SourceSession`] is opened at the start of one `search_businesses` call
//! and dropped when the call returns, on every path. It owns the client,
//! applies the per-request pause, rotates the User-Agent and retries
//! transient failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;

use crate::config::{apply_browser_headers, pick_user_agent, Config, DelayRange};
use crate::error_handling::{get_retry_strategy, SourceError};
use crate::initialization::init_client;
use crate::utils::is_retriable_source_error;

/// Transport settings an adapter opens its sessions with.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Fixed User-Agent, or `None` to rotate
    pub user_agent: Option<String>,
    /// Pause before every request
    pub request_delay: DelayRange,
}

impl FetchSettings {
    /// Extracts the transport settings from the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
            user_agent: config.user_agent.clone(),
            request_delay: config.request_delay,
        }
    }
}

/// One adapter call's network session.
pub(crate) struct SourceSession<'a> {
    source: &'a str,
    client: reqwest::Client,
    settings: &'a FetchSettings,
    requests: AtomicUsize,
}

impl<'a> SourceSession<'a> {
    /// Opens a session for `source`.
    pub(crate) fn open(source: &'a str, settings: &'a FetchSettings) -> Result<Self, SourceError> {
        let client = init_client(settings.timeout)?;
        log::debug!("{}: session opened", source);
        Ok(Self {
            source,
            client,
            settings,
            requests: AtomicUsize::new(0),
        })
    }

    /// Fetches an HTML page with browser headers.
    pub(crate) async fn get_html(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, SourceError> {
        self.settings.request_delay.pause().await;
        let strategy = get_retry_strategy(self.settings.max_retries);
        RetryIf::spawn(
            strategy,
            || {
                self.requests.fetch_add(1, Ordering::Relaxed);
                let request = apply_browser_headers(self.client.get(url).query(query)).header(
                    reqwest::header::USER_AGENT,
                    pick_user_agent(self.settings.user_agent.as_deref()),
                );
                async move {
                    let body = request.send().await?.error_for_status()?.text().await?;
                    Ok::<_, SourceError>(body)
                }
            },
            is_retriable_source_error,
        )
        .await
    }

    /// Fetches and decodes a JSON document.
    ///
    /// Errors are stripped of their URL, since API URLs carry credentials in
    /// the query string.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        self.settings.request_delay.pause().await;
        let strategy = get_retry_strategy(self.settings.max_retries);
        RetryIf::spawn(
            strategy,
            || {
                self.requests.fetch_add(1, Ordering::Relaxed);
                let request = self
                    .client
                    .get(url)
                    .query(query)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .header(
                        reqwest::header::USER_AGENT,
                        pick_user_agent(self.settings.user_agent.as_deref()),
                    );
                async move {
                    let response = request
                        .send()
                        .await
                        .and_then(|r| r.error_for_status())
                        .map_err(|e| SourceError::Http(e.without_url()))?;
                    let body = response
                        .json::<T>()
                        .await
                        .map_err(|e| SourceError::Http(e.without_url()))?;
                    Ok::<_, SourceError>(body)
                }
            },
            is_retriable_source_error,
        )
        .await
    }
}

impl Drop for SourceSession<'_> {
    fn drop(&mut self) {
        log::debug!(
            "{}: session closed after {} request(s)",
            self.source,
            self.requests.load(Ordering::Relaxed)
        );
    }
}
