//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - HTTP clients for adapter sessions and geocoding
//!
//! The database pool lives in [`crate::storage`].

mod client;
mod logger;

// Re-export public API
pub use client::{init_client, init_geocoding_client};
pub use logger::init_logger_with;
