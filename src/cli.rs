//! Command-line interface definitions.
//!
//! Every flag is optional; anything not given falls back to the config file
//! (if any) and then to the defaults in [`Config`](crate::config::Config).

use crate::config::{CultureRule, YearPolicy};
use clap::Parser;

/// Command-line arguments for the museum visitors pipeline.
///
/// # Examples
///
/// ```sh
/// # Scrape, store and correlate with defaults
/// museum_visitors
///
/// # Reproducible split, custom population file, no database
/// museum_visitors --seed 42 -w ./doc/worldcities.csv --skip-db
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "MUSEUM_VISITORS_CONFIG")]
    pub config: Option<String>,

    /// Output directory for the JSON dataset
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Path of the SQLite database to (re)create
    #[arg(short, long, env = "MUSEUM_DB_PATH")]
    pub database: Option<String>,

    /// CSV file with world city populations
    #[arg(short, long, env = "WORLD_CITIES_PATH")]
    pub world_cities: Option<String>,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Handling of `Established` values without a year
    #[arg(long, value_enum)]
    pub year_policy: Option<YearPolicy>,

    /// How the culture flag is derived from the museum type
    #[arg(long, value_enum)]
    pub culture_rule: Option<CultureRule>,

    /// Do not write the SQLite database
    #[arg(long)]
    pub skip_db: bool,

    /// Do not run the population/visitors regression
    #[arg(long)]
    pub skip_stats: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "museum_visitors",
            "--json-output-dir",
            "./json",
            "--database",
            "museums.db",
            "--year-policy",
            "fatal",
        ]);

        assert_eq!(cli.json_output_dir.as_deref(), Some("./json"));
        assert_eq!(cli.database.as_deref(), Some("museums.db"));
        assert_eq!(cli.year_policy, Some(YearPolicy::Fatal));
        assert!(!cli.skip_db);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "museum_visitors",
            "-j",
            "/tmp/json",
            "-w",
            "/tmp/worldcities.csv",
            "--skip-stats",
        ]);

        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(cli.world_cities.as_deref(), Some("/tmp/worldcities.csv"));
        assert!(cli.skip_stats);
    }
}
