//! Static city table used when the geocoding service cannot answer.

use crate::config::{CITY_COORDINATES, DEFAULT_COORDINATES};
use crate::models::GeocodeQuality;

/// Coordinates of the first known city named in `text` (case-insensitive).
pub fn city_coordinates(text: &str) -> Option<(f64, f64)> {
    let lowered = text.to_lowercase();
    CITY_COORDINATES
        .iter()
        .find(|(city, _, _)| lowered.contains(city))
        .map(|&(_, lat, lon)| (lat, lon))
}

/// Deterministic fallback: city in the address, then city in the location,
/// then the reference coordinate.
pub fn fallback_coordinates(address: Option<&str>, location: &str) -> ((f64, f64), GeocodeQuality) {
    address
        .and_then(city_coordinates)
        .or_else(|| city_coordinates(location))
        .map(|coords| (coords, GeocodeQuality::CityApproximate))
        .unwrap_or((DEFAULT_COORDINATES, GeocodeQuality::Default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_match_is_case_insensitive() {
        assert_eq!(
            city_coordinates("Shop 4, Bandra West, MUMBAI 400050"),
            Some((19.0760, 72.8777))
        );
    }

    #[test]
    fn test_every_table_city_resolves_to_its_entry() {
        for &(city, lat, lon) in CITY_COORDINATES {
            let address = format!("12 Main Road, {}", city.to_uppercase());
            assert_eq!(city_coordinates(&address), Some((lat, lon)));
        }
    }

    #[test]
    fn test_address_city_wins_over_location() {
        let (coords, quality) = fallback_coordinates(Some("Anna Salai, Chennai"), "Delhi");
        assert_eq!(coords, (13.0827, 80.2707));
        assert_eq!(quality, GeocodeQuality::CityApproximate);
    }

    #[test]
    fn test_location_used_when_address_has_no_city() {
        let (coords, quality) = fallback_coordinates(Some("Sector 17"), "Jaipur");
        assert_eq!(coords, (26.9124, 75.7873));
        assert_eq!(quality, GeocodeQuality::CityApproximate);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let (coords, quality) = fallback_coordinates(None, "Springfield");
        assert_eq!(coords, DEFAULT_COORDINATES);
        assert_eq!(quality, GeocodeQuality::Default);
    }
}
