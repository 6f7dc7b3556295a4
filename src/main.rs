//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `lead_harvest` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io;
use std::process;

use lead_harvest::config::{Cli, Command, RunMode, QUICK_MAX_RESULTS};
use lead_harvest::export::{export_csv, write_csv};
use lead_harvest::initialization::init_logger_with;
use lead_harvest::{Config, LeadFilter, LeadStore, Orchestrator, RunSummary, SqliteLeadStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting GOOGLE_MAPS_API_KEY in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match execute(cli.command, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("lead_harvest error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Scrape {
            location,
            category,
            mode,
            sources,
            max_results,
            output,
        } => {
            let orchestrator = Orchestrator::from_config(config).await?;
            let selected = (!sources.is_empty()).then_some(sources.as_slice());
            let category = category.as_deref();
            let summary = match mode {
                RunMode::Quick => orchestrator.run_quick(&location, category, selected).await,
                RunMode::Comprehensive => {
                    orchestrator
                        .run_comprehensive(&location, category, selected)
                        .await
                }
                RunMode::Custom => {
                    if sources.is_empty() {
                        anyhow::bail!("custom mode needs --sources");
                    }
                    orchestrator
                        .run_custom(
                            &location,
                            category,
                            &sources,
                            max_results.unwrap_or(QUICK_MAX_RESULTS),
                        )
                        .await
                }
            }
            .context("Scrape run failed")?;

            print_summary(&summary);
            if let Some(path) = output {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                let rows = write_csv(&summary.businesses, file)?;
                println!("Wrote {} row(s) to {}", rows, path.display());
            }
            println!("Results saved in {}", config.db_path.display());
        }

        Command::Export {
            output,
            location,
            category,
        } => {
            let store = SqliteLeadStore::open(&config.db_path).await?;
            let filter = LeadFilter {
                location,
                category,
                date_range: None,
            };
            let rows = export_csv(&store, output.as_deref(), &filter).await?;
            eprintln!("Exported {} business(es)", rows);
        }

        Command::Query {
            location,
            category,
            since,
            until,
        } => {
            let store = SqliteLeadStore::open(&config.db_path).await?;
            let filter = LeadFilter {
                location,
                category,
                date_range: since.zip(until),
            };
            let records = store.query(&filter).await.context("Query failed")?;
            write_csv(&records, io::stdout())?;
        }

        Command::Search { text } => {
            let store = SqliteLeadStore::open(&config.db_path).await?;
            let records = store.search(&text).await.context("Search failed")?;
            write_csv(&records, io::stdout())?;
        }

        Command::Stats => {
            let store = SqliteLeadStore::open(&config.db_path).await?;
            let stats = store
                .statistics()
                .await
                .context("Failed to compute statistics")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Command::Session { id } => {
            let store = SqliteLeadStore::open(&config.db_path).await?;
            let session = store
                .session(id)
                .await
                .context("Failed to load session")?
                .with_context(|| format!("Session {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&session)?);
            println!("Duration: {}s", session.duration_seconds());
        }

        Command::Probe { location } => {
            let orchestrator = Orchestrator::from_config(config).await?;
            for probe in orchestrator.probe_sources(&location).await {
                match (probe.working, probe.failure) {
                    (true, _) => println!("✅ {}: working", probe.source),
                    (false, Some(failure)) => println!("❌ {}: {}", probe.source, failure),
                    (false, None) => println!("⚠️  {}: no results", probe.source),
                }
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "✅ Scraped {} unique business{} for {} from {} source{} in {:.1}s (session {})",
        summary.total_businesses,
        if summary.total_businesses == 1 { "" } else { "es" },
        summary.location,
        summary.sources_scraped.len(),
        if summary.sources_scraped.len() == 1 { "" } else { "s" },
        summary.elapsed().num_milliseconds() as f64 / 1000.0,
        summary.session_id
    );
    for outcome in &summary.businesses_by_source {
        println!(
            "   {}: {} found, {} new",
            outcome.source, outcome.found, outcome.stored
        );
    }
    if !summary.errors.is_empty() {
        println!("Errors ({}):", summary.errors.len());
        for error in &summary.errors {
            println!("   {}", error);
        }
    }
}
