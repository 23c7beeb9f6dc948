//! Data models for museums as they move through the pipeline.
//!
//! - [`EntityStub`]: one row of the listing table
//! - [`AttributePanel`]: the raw key/value infobox of one museum page
//! - [`DraftRecord`]: a stub zipped with its panel, before normalization
//! - [`NormalizedRecord`]: the final uniform record
//! - [`CityPopulation`] / [`MuseumWithPopulation`]: the population join
//! - [`Dataset`]: the JSON export envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Infobox label → cleaned value. Labels are whatever the page uses.
pub type AttributePanel = BTreeMap<String, String>;

/// One museum row from the listing page.
///
/// Stubs keep the listing order; that order is the row identity used to zip
/// stubs with their panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStub {
    pub name: String,
    pub city: String,
    pub visitor_count: u64,
    /// Wikipedia page title, `None` for red links.
    pub link_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftRecord {
    pub stub: EntityStub,
    pub panel: AttributePanel,
}

/// The five museum categories derived from the infobox `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryFlags {
    pub is_art_museum: bool,
    pub is_history_museum: bool,
    pub is_natural_museum: bool,
    pub is_culture_museum: bool,
    pub is_science_museum: bool,
}

/// A museum after pruning, renaming and field normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub city: String,
    pub visitors: u64,
    pub link_id: Option<String>,
    pub established_year: Option<String>,
    pub visitors_rank: Option<String>,
    #[serde(flatten)]
    pub categories: CategoryFlags,
    /// Surviving infobox fields, keyed by their (renamed) label.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl NormalizedRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// One row of the reference population dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityPopulation {
    pub city: String,
    pub country: String,
    pub population: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuseumWithPopulation {
    #[serde(flatten)]
    pub museum: NormalizedRecord,
    pub country: Option<String>,
    pub population: Option<u64>,
}

/// What a run writes to `museums.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Dataset {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    pub local_time: String,
    /// Title of the listing page the museums came from.
    pub source_page: String,
    pub records: Vec<MuseumWithPopulation>,
}
