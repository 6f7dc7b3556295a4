//! Browser-like request headers.
//!
//! Directory sites block obvious bots, so every adapter request carries the
//! same realistic header set plus a rotated User-Agent.

use rand::seq::IndexedRandom;

use crate::config::constants::{DEFAULT_USER_AGENT, USER_AGENTS};

/// Accept header sent with HTML requests
pub const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
/// Accept-Language header
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Applies the standard browser headers to a `reqwest::RequestBuilder`.
pub(crate) fn apply_browser_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header(reqwest::header::ACCEPT, HTML_ACCEPT)
        .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
        .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
        .header(reqwest::header::CACHE_CONTROL, "max-age=0")
        .header(
            reqwest::header::HeaderName::from_static("sec-fetch-dest"),
            "document",
        )
        .header(
            reqwest::header::HeaderName::from_static("sec-fetch-mode"),
            "navigate",
        )
        .header(
            reqwest::header::HeaderName::from_static("sec-fetch-site"),
            "none",
        )
}

/// Picks a User-Agent for the next request.
///
/// Returns `fixed` when the caller pinned one, otherwise a random entry from
/// [`USER_AGENTS`].
pub(crate) fn pick_user_agent(fixed: Option<&str>) -> String {
    if let Some(ua) = fixed {
        return ua.to_string();
    }
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(DEFAULT_USER_AGENT)
        .to_string()
}
