//! Run configuration.
//!
//! A [`Config`] is built once at startup and passed by reference to every
//! stage. Values are layered: built-in defaults, then an optional YAML file,
//! then command-line flags (see [`Config::apply_cli`]).
//!
//! # Example file
//!
//! ```yaml
//! listing_page: List_of_most-visited_museums
//! prune_threshold: 0.9
//! year_policy: missing
//! culture_rule: legacy
//! world_cities_path: ./doc/worldcities.csv
//! database_path: museum_analysis.db
//! seed: 42
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use clap::ValueEnum;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// What to do when an `Established` value contains no recognizable year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum YearPolicy {
    /// Abort the run.
    Fatal,
    /// Treat the year as missing and keep going.
    #[default]
    Missing,
}

/// How the `is_culture_museum` flag is derived from the `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CultureRule {
    /// Any museum with a `Type` value is flagged as a culture museum.
    #[default]
    Legacy,
    /// Flag only when the type mentions "culture" or "archaeology".
    Keyword,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL that page titles are joined onto.
    pub base_url: String,
    /// Title of the page holding the most-visited museums table.
    pub listing_page: String,
    /// Link target of the listing row that is a citation, not a museum.
    pub skip_anchor: String,
    /// Panel fields missing from at least this fraction of museums are dropped.
    pub prune_threshold: f64,
    pub year_policy: YearPolicy,
    pub culture_rule: CultureRule,
    pub world_cities_path: String,
    pub database_path: String,
    pub json_output_dir: String,
    /// Share of the joined rows held out for evaluating the regression.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle; random when unset.
    pub seed: Option<u64>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/wiki/".to_string(),
            listing_page: "List_of_most-visited_museums".to_string(),
            skip_anchor: "#cite_note-13".to_string(),
            prune_threshold: 0.9,
            year_policy: YearPolicy::default(),
            culture_rule: CultureRule::default(),
            world_cities_path: "doc/worldcities.csv".to_string(),
            database_path: "museum_analysis.db".to_string(),
            json_output_dir: "./json".to_string(),
            test_fraction: 0.3,
            seed: None,
            request_timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load a YAML config file. Keys that are absent keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&raw)?;
        info!("Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Overlay the flags that were given on the command line.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.json_output_dir {
            self.json_output_dir = dir.clone();
        }
        if let Some(db) = &cli.database {
            self.database_path = db.clone();
        }
        if let Some(path) = &cli.world_cities {
            self.world_cities_path = path.clone();
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(policy) = cli.year_policy {
            self.year_policy = policy;
        }
        if let Some(rule) = cli.culture_rule {
            self.culture_rule = rule;
        }
        self
    }

    /// Check the fractions before a run starts.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - all values are usable
    /// * `Err(ConfigError::OutOfRange)` - `prune_threshold` is outside `[0, 1]`
    ///   or `test_fraction` is outside `(0, 1)`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.prune_threshold) {
            return Err(ConfigError::OutOfRange {
                key: "prune_threshold",
                range: "[0, 1]",
                value: self.prune_threshold,
            });
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::OutOfRange {
                key: "test_fraction",
                range: "(0, 1)",
                value: self.test_fraction,
            });
        }
        Ok(())
    }
}
