//! Data-quality summary of a run's output.

use serde::Serialize;

use crate::models::Business;
use crate::normalize::has_demo_marker;

/// Field coverage over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    /// Records examined
    pub total: usize,
    /// Records with a phone number
    pub with_contact: usize,
    /// Records with a website
    pub with_website: usize,
    /// Records with an address
    pub with_address: usize,
    /// Records with latitude and longitude
    pub with_coordinates: usize,
    /// Coordinates from the city table or the default reference point
    pub approximate_coordinates: usize,
    /// Records whose name or address looks synthetic
    pub demo_markers: usize,
}

impl QualityReport {
    /// Counts field coverage over `records`.
    pub fn from_records(records: &[Business]) -> Self {
        let count = |pred: &dyn Fn(&Business) -> bool| records.iter().filter(|b| pred(b)).count();
        Self {
            total: records.len(),
            with_contact: count(&|b| b.contact.is_some()),
            with_website: count(&|b| b.website.is_some()),
            with_address: count(&|b| b.address.is_some()),
            with_coordinates: count(&|b| b.has_coordinates()),
            approximate_coordinates: count(&|b| {
                b.geocode_quality.is_some_and(|q| q.is_approximate())
            }),
            demo_markers: count(&|b| {
                has_demo_marker(&b.name) || b.address.as_deref().is_some_and(has_demo_marker)
            }),
        }
    }

    /// `count` as a percentage of `total` (0 when empty).
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }

    /// Logs the coverage figures.
    pub fn log(&self) {
        if self.total == 0 {
            log::info!("Data quality: no records");
            return;
        }
        log::info!(
            "Data quality over {} record(s): contact {:.1}%, website {:.1}%, address {:.1}%, coordinates {:.1}% ({} approximate)",
            self.total,
            self.percentage(self.with_contact),
            self.percentage(self.with_website),
            self.percentage(self.with_address),
            self.percentage(self.with_coordinates),
            self.approximate_coordinates
        );
        if self.demo_markers > 0 {
            log::warn!(
                "{} record(s) carry demo markers in their name or address",
                self.demo_markers
            );
        }
    }
}
