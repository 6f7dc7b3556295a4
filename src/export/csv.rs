//! CSV export functionality.
//!
//! One row per business with a fixed column order:
//! name, contact, address, website, category, location, scraped_at, source.

use anyhow::{Context, Result};
use csv::Writer;
use std::io::{self, Write};
use std::path::Path;

use crate::models::Business;
use crate::storage::{LeadFilter, LeadStore};

/// Column headers, in output order.
pub const CSV_COLUMNS: [&str; 8] = [
    "name",
    "contact",
    "address",
    "website",
    "category",
    "location",
    "scraped_at",
    "source",
];

/// Writes `records` as CSV (header included) and returns the row count.
///
/// Absent optional fields are written as empty cells; `scraped_at` is
/// RFC 3339 in UTC.
pub fn write_csv<W: Write>(records: &[Business], writer: W) -> Result<usize> {
    let mut writer = Writer::from_writer(writer);
    writer
        .write_record(CSV_COLUMNS)
        .context("Failed to write CSV header")?;

    for record in records {
        let scraped_at = record
            .scraped_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        writer
            .write_record([
                record.name.as_str(),
                record.contact.as_deref().unwrap_or_default(),
                record.address.as_deref().unwrap_or_default(),
                record.website.as_deref().unwrap_or_default(),
                record.category.as_deref().unwrap_or_default(),
                record.location.as_str(),
                scraped_at.as_str(),
                record.source.as_str(),
            ])
            .with_context(|| format!("Failed to write CSV row for '{}'", record.name))?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(records.len())
}

/// Exports stored businesses matching `filter` to `output` (stdout if None).
///
/// Returns the number of records exported.
pub async fn export_csv(
    store: &dyn LeadStore,
    output: Option<&Path>,
    filter: &LeadFilter,
) -> Result<usize> {
    let records = store
        .query(filter)
        .await
        .context("Failed to load businesses for export")?;

    // Trait object to handle both File and Stdout
    let writer: Box<dyn Write> = if let Some(output_path) = output {
        let file = std::fs::File::create(output_path).with_context(|| {
            format!("Failed to create output file: {}", output_path.display())
        })?;
        Box::new(file)
    } else {
        Box::new(io::stdout())
    };

    let count = write_csv(&records, writer)?;
    log::info!("Exported {} business(es) to CSV", count);
    Ok(count)
}
