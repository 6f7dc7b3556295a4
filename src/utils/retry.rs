//! Error retriability.

use crate::error_handling::SourceError;

/// Determines if a `reqwest::Error` is worth retrying.
///
/// # Retriable
///
/// - Timeouts and connection failures
/// - Rate limiting (429 Too Many Requests)
/// - Server errors (5xx)
///
/// # Non-Retriable
///
/// - Client errors (4xx except 429), including 403 bot blocks
/// - Redirect and decode errors
pub(crate) fn is_retriable_reqwest_error(error: &reqwest::Error) -> bool {
    if let Some(status) = error.status() {
        let status_code = status.as_u16();

        // 429 is retriable with backoff
        if status_code == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
            return true;
        }
        if (400..500).contains(&status_code) {
            return false;
        }
        if (500..600).contains(&status_code) {
            return true;
        }
    }

    if error.is_redirect() || error.is_decode() || error.is_builder() {
        return false;
    }

    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Determines if a source error is worth retrying.
///
/// Only transport failures are; API status errors, parse failures and missing
/// credentials will not change on a second attempt.
pub(crate) fn is_retriable_source_error(error: &SourceError) -> bool {
    match error {
        SourceError::Http(e) => is_retriable_reqwest_error(e),
        SourceError::Api(_)
        | SourceError::Parse(_)
        | SourceError::MissingCredential(_)
        | SourceError::Session(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_transport_errors_are_not_retriable() {
        assert!(!is_retriable_source_error(&SourceError::MissingCredential(
            "GOOGLE_MAPS_API_KEY"
        )));
        assert!(!is_retriable_source_error(&SourceError::Api(
            "OVER_QUERY_LIMIT".into()
        )));
        assert!(!is_retriable_source_error(&SourceError::Parse(
            "unexpected end of input".into()
        )));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retriable() {
        // Port 9 (discard) on localhost is closed in test environments
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing listens on the discard port");
        assert!(is_retriable_reqwest_error(&err));
    }
}
