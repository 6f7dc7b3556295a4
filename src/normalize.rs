//! Record normalization.
//!
//! Turns a [`RawCandidate`] into a [`Business`] or drops it. Dropping is a
//! filtering decision, not an error: nothing here returns `Result`.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;

use crate::config::{MAX_NAME_LENGTH, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};
use crate::models::{Business, DataType, GeocodeQuality, RawCandidate};

/// Values sources print when a field is empty.
const PLACEHOLDERS: &[&str] = &["n/a", "na", "null", "none", "-", "not available"];

/// Tokens marking synthetic listings.
pub(crate) const DEMO_MARKERS: &[&str] = &["demo", "fake", "test", "sample"];

static INDIAN_MOBILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+91[-\s]?|\b)[6-9]\d{9}\b").unwrap_or_else(|e| {
        panic!("Failed to compile mobile number regex: {e}. This is a programming error.")
    })
});

static GENERIC_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\s\-().]{7,}\d").unwrap_or_else(|e| {
        panic!("Failed to compile phone number regex: {e}. This is a programming error.")
    })
});

/// Query context a candidate is normalized against.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Location the run searched for
    pub location: &'a str,
    /// Category the run searched for, if any
    pub category: Option<&'a str>,
    /// Canonical id of the producing adapter
    pub source: &'a str,
}

/// Normalizes one candidate, stamping `scraped_at` with the current time.
///
/// Returns `None` when the candidate has no usable name, no resolvable
/// location, or none of contact/website/address.
pub fn normalize(raw: &RawCandidate, ctx: &NormalizeContext<'_>) -> Option<Business> {
    normalize_at(raw, ctx, Utc::now())
}

/// Normalizes one candidate with an explicit timestamp.
pub fn normalize_at(
    raw: &RawCandidate,
    ctx: &NormalizeContext<'_>,
    scraped_at: DateTime<Utc>,
) -> Option<Business> {
    let name = clean_text(raw.name.as_deref()).map(|n| truncate_chars(&n, MAX_NAME_LENGTH))?;

    let address = clean_text(raw.address.as_deref());
    let contact = raw.contact.as_deref().and_then(extract_phone);
    let website = raw.website.as_deref().and_then(normalize_website);

    if contact.is_none() && website.is_none() && address.is_none() {
        return None;
    }

    let location = clean_text(raw.location.as_deref())
        .or_else(|| clean_text(Some(ctx.location)))
        .or_else(|| address.as_deref().and_then(location_from_address))?;

    let category = clean_text(raw.category.as_deref()).or_else(|| clean_text(ctx.category));

    let (latitude, longitude) = valid_coordinates(raw.latitude, raw.longitude)
        .map_or((None, None), |(lat, lon)| (Some(lat), Some(lon)));
    let geocode_quality = latitude.map(|_| GeocodeQuality::Provided);

    Some(Business {
        name,
        location,
        category,
        address,
        contact,
        website,
        latitude,
        longitude,
        geocode_quality,
        source: ctx.source.to_string(),
        scraped_at,
        data_type: if raw.verified {
            DataType::Verified
        } else {
            DataType::Raw
        },
    })
}

/// Normalizes a batch, dropping rejected candidates.
pub fn normalize_all(raws: &[RawCandidate], ctx: &NormalizeContext<'_>) -> Vec<Business> {
    let now = Utc::now();
    let records: Vec<Business> = raws
        .iter()
        .filter_map(|raw| normalize_at(raw, ctx, now))
        .collect();
    let rejected = raws.len() - records.len();
    if rejected > 0 {
        log::debug!(
            "{}: dropped {} of {} candidates missing required fields",
            ctx.source,
            rejected,
            raws.len()
        );
    }
    records
}

/// Whether `value` contains a demo marker as a whole token.
pub(crate) fn has_demo_marker(value: &str) -> bool {
    value
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| DEMO_MARKERS.contains(&token))
}

/// Collapses whitespace and drops blanks and placeholder values.
fn clean_text(value: Option<&str>) -> Option<String> {
    let collapsed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || PLACEHOLDERS.contains(&collapsed.to_lowercase().as_str()) {
        None
    } else {
        Some(collapsed)
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}

/// Extracts a phone number from noisy text.
///
/// The Indian mobile pattern is tried first, then a generic international
/// one. The result is digits only, with a leading `+` kept when present.
pub fn extract_phone(value: &str) -> Option<String> {
    let cleaned = clean_text(Some(value))?;
    if has_demo_marker(&cleaned) {
        return None;
    }

    [&*INDIAN_MOBILE, &*GENERIC_PHONE]
        .iter()
        .flat_map(|re| re.find_iter(&cleaned))
        .find_map(|m| digits_with_plus(m.as_str()))
}

fn digits_with_plus(matched: &str) -> Option<String> {
    let digits: String = matched.chars().filter(char::is_ascii_digit).collect();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }
    if matched.trim_start().starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

/// Normalizes a website to an absolute http(s) URL with a dotted host.
pub fn normalize_website(value: &str) -> Option<String> {
    let cleaned = clean_text(Some(value))?;
    let lowered = cleaned.to_lowercase();
    if has_demo_marker(&cleaned) || lowered.contains("localhost") {
        return None;
    }

    let candidate = if lowered.starts_with("www.") {
        format!("http://{cleaned}")
    } else {
        cleaned
    };

    let url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return None;
    }
    Some(url.to_string())
}

fn location_from_address(address: &str) -> Option<String> {
    address
        .rsplit(',')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .and_then(|segment| clean_text(Some(segment)))
}

pub(crate) fn valid_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<(f64, f64)> {
    let (lat, lon) = (latitude?, longitude?);
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    valid.then_some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NormalizeContext<'static> {
        NormalizeContext {
            location: "Mumbai",
            category: Some("restaurants"),
            source: "justdial",
        }
    }

    fn candidate(name: &str) -> RawCandidate {
        RawCandidate {
            name: Some(name.to_string()),
            contact: Some("Call: +91 98765 43210".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_missing_name() {
        let raw = RawCandidate {
            contact: Some("9876543210".into()),
            ..Default::default()
        };
        assert!(normalize(&raw, &ctx()).is_none());
    }

    #[test]
    fn test_rejects_placeholder_name() {
        assert!(normalize(&candidate("  N/A "), &ctx()).is_none());
    }

    #[test]
    fn test_rejects_without_contact_website_or_address() {
        let raw = RawCandidate {
            name: Some("Cafe Mocha".into()),
            contact: Some("not available".into()),
            website: Some("-".into()),
            address: Some("   ".into()),
            ..Default::default()
        };
        assert!(normalize(&raw, &ctx()).is_none());
    }

    #[test]
    fn test_address_alone_is_enough() {
        let raw = RawCandidate {
            name: Some("Cafe Mocha".into()),
            address: Some("12 Linking Road, Bandra".into()),
            ..Default::default()
        };
        let business = normalize(&raw, &ctx()).expect("kept");
        assert_eq!(business.address.as_deref(), Some("12 Linking Road, Bandra"));
        assert!(business.contact.is_none());
    }

    #[test]
    fn test_stamps_context_fields() {
        let business = normalize(&candidate("  Sharma   Sweets "), &ctx()).expect("kept");
        assert_eq!(business.name, "Sharma Sweets");
        assert_eq!(business.location, "Mumbai");
        assert_eq!(business.category.as_deref(), Some("restaurants"));
        assert_eq!(business.source, "justdial");
        assert_eq!(business.data_type, DataType::Raw);
        assert!(business.geocode_quality.is_none());
    }

    #[test]
    fn test_name_truncated_to_limit() {
        let long = "क".repeat(MAX_NAME_LENGTH + 20);
        let business = normalize(&candidate(&long), &ctx()).expect("kept");
        assert_eq!(business.name.chars().count(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_phone_extraction_patterns() {
        assert_eq!(
            extract_phone("Call: +91 98765 43210").as_deref(),
            Some("+919876543210")
        );
        assert_eq!(
            extract_phone("Mobile 9876543210 (24x7)").as_deref(),
            Some("9876543210")
        );
        assert_eq!(extract_phone("011-2345-6789").as_deref(), Some("01123456789"));
        assert_eq!(
            extract_phone("+1 (415) 555-2671").as_deref(),
            Some("+14155552671")
        );
        assert!(extract_phone("12345").is_none());
        assert!(extract_phone("demo 9876543210").is_none());
        assert!(extract_phone("1234567890123456789").is_none());
    }

    #[test]
    fn test_website_normalization() {
        assert_eq!(
            normalize_website("www.sharmasweets.in").as_deref(),
            Some("http://www.sharmasweets.in/")
        );
        assert_eq!(
            normalize_website("https://latest-news.example.com/menu").as_deref(),
            Some("https://latest-news.example.com/menu")
        );
        assert!(normalize_website("http://localhost:8080").is_none());
        assert!(normalize_website("https://demo.example.com").is_none());
        assert!(normalize_website("not a url").is_none());
        assert!(normalize_website("ftp://files.example.com").is_none());
        assert!(normalize_website("http://intranet/").is_none());
    }

    #[test]
    fn test_location_falls_back_to_address_tail() {
        let raw = RawCandidate {
            name: Some("Cafe".into()),
            address: Some("MG Road, Pune".into()),
            ..Default::default()
        };
        let ctx = NormalizeContext {
            location: "  ",
            category: None,
            source: "s",
        };
        let business = normalize(&raw, &ctx).expect("kept");
        assert_eq!(business.location, "Pune");
        assert!(business.category.is_none());
    }

    #[test]
    fn test_candidate_location_wins_over_query() {
        let mut raw = candidate("Cafe");
        raw.location = Some("Thane".into());
        assert_eq!(normalize(&raw, &ctx()).expect("kept").location, "Thane");
    }

    #[test]
    fn test_coordinates_kept_only_when_valid() {
        let mut raw = candidate("Cafe");
        raw.latitude = Some(19.07);
        raw.longitude = Some(72.87);
        raw.verified = true;
        let business = normalize(&raw, &ctx()).expect("kept");
        assert_eq!(business.latitude, Some(19.07));
        assert_eq!(business.geocode_quality, Some(GeocodeQuality::Provided));
        assert_eq!(business.data_type, DataType::Verified);

        raw.latitude = Some(190.0);
        let business = normalize(&raw, &ctx()).expect("kept");
        assert!(business.latitude.is_none() && business.longitude.is_none());
        assert!(business.geocode_quality.is_none());

        raw.latitude = Some(f64::NAN);
        assert!(normalize(&raw, &ctx()).expect("kept").latitude.is_none());
    }

    #[test]
    fn test_normalize_all_drops_invalid() {
        let raws = vec![
            candidate("A"),
            RawCandidate {
                name: Some("No Contact".into()),
                ..Default::default()
            },
            candidate("B"),
        ];
        let records = normalize_all(&raws, &ctx());
        let names: Vec<&str> = records.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_demo_marker_is_token_based() {
        assert!(has_demo_marker("Test Listing"));
        assert!(has_demo_marker("fake-shop"));
        assert!(!has_demo_marker("Contest Bakery"));
        assert!(!has_demo_marker("Latest Mobiles"));
    }
}
