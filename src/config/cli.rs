//! Command-line options.
//!
//! The binary is a thin wrapper: these types are parsed by clap and turned
//! into a library [`Config`] plus one [`Command`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, INTER_SOURCE_DELAY_MAX_MS, INTER_SOURCE_DELAY_MIN_MS, MAX_RETRIES,
    REQUEST_DELAY_MAX_MS, REQUEST_DELAY_MIN_MS, REQUEST_TIMEOUT_SECS, SOURCE_TIMEOUT,
};
use crate::config::types::{Config, DelayRange, LogFormat, LogLevel};

/// Scrape mode selecting the result cap and default source list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Small cap, fastest source only
    Quick,
    /// Larger cap, every configured source
    Comprehensive,
    /// Caller-chosen sources and cap
    Custom,
}

/// Command-line options for the lead harvester.
///
/// # Examples
///
/// ```bash
/// # Quick scrape of one city
/// lead_harvest scrape Delhi --category restaurants
///
/// # Every source, larger cap
/// lead_harvest scrape Mumbai --mode comprehensive
///
/// # Export stored records for a location
/// lead_harvest export --location Delhi --output delhi.csv
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "lead_harvest",
    about = "Collects business listings from public directories into a local database."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, global = true, value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Retries after the first attempt for retriable HTTP failures
    #[arg(long, global = true, default_value_t = MAX_RETRIES)]
    pub max_retries: usize,

    /// Fixed HTTP User-Agent header value.
    ///
    /// When omitted, a browser-like User-Agent is picked at random per request.
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Google Places API key (the maps source is skipped without it)
    #[arg(long, global = true, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub maps_api_key: Option<String>,

    /// Skip the geocoding service and use the built-in city table only
    #[arg(long, global = true)]
    pub no_geocoding: bool,

    /// Disable the randomized pauses between requests and between sources
    #[arg(long, global = true)]
    pub no_delay: bool,

    /// Deadline in seconds for one source's whole search (0 disables it)
    #[arg(long, global = true, default_value_t = SOURCE_TIMEOUT.as_secs())]
    pub source_timeout_seconds: u64,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Operation to perform.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape sources for a location and store the results
    Scrape {
        /// City or area to search
        location: String,

        /// Business category (defaults to a generic term list)
        #[arg(long)]
        category: Option<String>,

        /// Scrape mode: quick|comprehensive|custom
        #[arg(long, value_enum, default_value_t = RunMode::Quick)]
        mode: RunMode,

        /// Sources to scrape (custom mode); aliases are accepted
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,

        /// Cap on candidates requested from each source (custom mode)
        #[arg(long)]
        max_results: Option<usize>,

        /// Also write the scraped businesses to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export stored businesses to CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Filter by location (substring match)
        #[arg(long)]
        location: Option<String>,

        /// Filter by category (substring match)
        #[arg(long)]
        category: Option<String>,
    },

    /// Print stored businesses matching a filter
    Query {
        /// Filter by location (substring match)
        #[arg(long)]
        location: Option<String>,

        /// Filter by category (substring match)
        #[arg(long)]
        category: Option<String>,

        /// Only records scraped on or after this date (YYYY-MM-DD)
        #[arg(long, requires = "until")]
        since: Option<chrono::NaiveDate>,

        /// Only records scraped on or before this date (YYYY-MM-DD)
        #[arg(long, requires = "since")]
        until: Option<chrono::NaiveDate>,
    },

    /// Free-text search over stored names, addresses and categories
    Search {
        /// Text to look for
        text: String,
    },

    /// Print aggregate statistics about stored businesses
    Stats,

    /// Show one scraping session
    Session {
        /// Session id
        id: i64,
    },

    /// Check which sources answer for a test location
    Probe {
        /// Test location
        #[arg(default_value = "Delhi")]
        location: String,
    },
}

impl Cli {
    /// Builds the library configuration from the parsed options.
    pub fn to_config(&self) -> Config {
        let (request_delay, inter_source_delay) = if self.no_delay {
            (DelayRange::none(), DelayRange::none())
        } else {
            (
                DelayRange::new(REQUEST_DELAY_MIN_MS, REQUEST_DELAY_MAX_MS),
                DelayRange::new(INTER_SOURCE_DELAY_MIN_MS, INTER_SOURCE_DELAY_MAX_MS),
            )
        };
        let source_timeout = match self.source_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Config {
            db_path: self.db_path.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            timeout_seconds: self.timeout_seconds,
            max_retries: self.max_retries,
            user_agent: self.user_agent.clone(),
            request_delay,
            inter_source_delay,
            source_timeout,
            maps_api_key: self.maps_api_key.clone().filter(|k| !k.trim().is_empty()),
            geocoding_enabled: !self.no_geocoding,
            ..Config::default()
        }
    }
}
