//! # Museum Visitors
//!
//! Builds a small dataset of the world's most-visited museums from Wikipedia
//! and checks how strongly a museum's visitor count follows the population
//! of its city.
//!
//! ## Usage
//!
//! ```sh
//! museum_visitors -w ./doc/worldcities.csv --seed 42
//! ```
//!
//! ## Architecture
//!
//! 1. **Scraping**: parse the most-visited museums listing, then each museum's infobox
//! 2. **Normalizing**: prune sparse infobox fields, extract years, tag categories
//! 3. **Joining**: attach city country and population from a world cities CSV
//! 4. **Output**: write `museums.json` and the `city`/`museum` SQLite tables
//! 5. **Statistics**: fit visitors on population and report r, MAE, MSE, RMSE

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod population;
mod scrapers;
mod stats;
mod utils;

use cli::Cli;
use config::Config;
use models::Dataset;
use outputs::{json, sqlite};
use scrapers::wikipedia::WikipediaSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("museum_visitors starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration: defaults < file < flags ----
    let config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    }
    .apply_cli(&args);
    config.validate()?;
    info!(
        listing = %config.listing_page,
        year_policy = ?config.year_policy,
        culture_rule = ?config.culture_rule,
        "Configuration ready"
    );

    // ---- Scrape and normalize ----
    let source = WikipediaSource::new(&config)?;
    let records = pipeline::run(&source, &config).await.inspect_err(|e| {
        error!(error = %e, "Pipeline run failed");
    })?;

    // ---- Population join ----
    let cities = population::load_reference_cities(&config.world_cities_path)?;
    let joined = population::join_population(records, &cities);

    // ---- JSON output ----
    let now = Local::now();
    let dataset = Dataset {
        local_date: now.date_naive().to_string(),
        local_time: now.time().to_string(),
        source_page: config.listing_page.clone(),
        records: joined,
    };
    if let Err(e) = json::write_dataset(&dataset, &config.json_output_dir).await {
        error!(error = %e, "Failed to write JSON dataset");
    }

    // ---- SQLite output ----
    if args.skip_db {
        info!("Skipping database output");
    } else {
        let tables = sqlite::build_tables(&dataset.records);
        sqlite::write_database(&config.database_path, &tables)?;
    }

    // ---- Population vs. visitors ----
    if args.skip_stats {
        info!("Skipping regression");
    } else {
        match stats::correlate_population_visitors(
            &dataset.records,
            config.test_fraction,
            config.seed,
        ) {
            Ok(report) => info!(
                coefficient = report.model.coefficient,
                intercept = report.model.intercept,
                correlation = report.correlation,
                mean_absolute_error = report.mean_absolute_error,
                mean_squared_error = report.mean_squared_error,
                root_mean_squared_error = report.root_mean_squared_error,
                train = report.train_size,
                test = report.test_size,
                "Population vs. visitors"
            ),
            Err(e) => warn!(error = %e, "Could not correlate population and visitors"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        museums = dataset.records.len(),
        "Execution complete"
    );

    Ok(())
}
