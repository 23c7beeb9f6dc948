//! Error types for each stage of the museum pipeline.
//!
//! The taxonomy follows how failures are treated by the orchestrator:
//!
//! | Kind | Type | Treatment |
//! |------|------|-----------|
//! | source unavailable | [`FetchError`] | fatal for the listing, empty panel for a museum page |
//! | structural mismatch | [`ParseError`] | always fatal |
//! | pattern extraction failure | [`NormalizeError`] | fatal only under [`YearPolicy::Fatal`](crate::config::YearPolicy::Fatal) |
//!
//! Missing values are not errors; they are `None` in the models.

use thiserror::Error;

/// A configuration value outside its allowed range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be within {range}, got {value}")]
    OutOfRange {
        key: &'static str,
        range: &'static str,
        value: f64,
    },
}

/// Failure to retrieve a page from a [`PageSource`](crate::scrapers::PageSource).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page `{0}` does not exist")]
    NotFound(String),

    #[error("page `{page}` returned HTTP {status}")]
    Status { page: String, status: u16 },

    #[error("invalid page url for `{page}`: {source}")]
    Url {
        page: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request for `{page}` failed: {source}")]
    Http {
        page: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The markup did not have the shape the parsers rely on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no year between 1000 and 2999 found in `{0}`")]
    NoYear(String),
}

/// Anything that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("listing page unavailable: {0}")]
    ListingUnavailable(#[source] FetchError),

    #[error("failed to parse `{page}`: {source}")]
    Parse {
        page: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to normalize `{museum}`: {source}")]
    Normalize {
        museum: String,
        #[source]
        source: NormalizeError,
    },
}

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("failed to read world cities file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("not enough data to fit a model: {0}")]
    InsufficientData(String),
}
