//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, caps, retry parameters, city table)
//! - Browser request headers
//! - Library configuration and the CLI definition

mod cli;
mod constants;
mod headers;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, RunMode};
pub use constants::*;
pub(crate) use headers::{apply_browser_headers, pick_user_agent};
pub use types::{Config, DelayRange, DirectoryEndpoint, LogFormat, LogLevel};
