//! Utility functions.
//!
//! This module provides:
//! - Error retriability determination
//! - String sanitization utilities
//! - CSS selector parsing and extraction utilities

mod retry;
mod sanitize;
mod selector;

pub(crate) use retry::is_retriable_source_error;
pub use sanitize::sanitize_and_truncate_error_message;
pub use selector::{first_attr, first_text, parse_selectors};
