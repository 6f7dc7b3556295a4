//! Export of stored businesses.
//!
//! CSV is the only format: a flattened row per business with a fixed column
//! order.

mod csv;

pub use self::csv::{export_csv, write_csv, CSV_COLUMNS};
