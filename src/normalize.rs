//! Turning raw infobox panels into uniform museum records.
//!
//! Three steps run after every museum has been scraped:
//!
//! 1. [`prune_sparse_fields`]: drop infobox labels that almost no museum has
//! 2. [`extract_year`] / [`tag_categories`]: type the `Established` and `Type` fields
//! 3. [`normalize_record`]: rename the known labels and build a [`NormalizedRecord`]
//!
//! Everything here is pure; the only side effects are log events.

use crate::config::{CultureRule, YearPolicy};
use crate::error::NormalizeError;
use crate::models::{CategoryFlags, DraftRecord, NormalizedRecord};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// Greedy prefix, so the last year in the text wins.
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s).*([12][0-9]{3})").unwrap());

pub const ESTABLISHED_LABEL: &str = "Established";
pub const TYPE_LABEL: &str = "Type";
pub const VISITORS_LABEL: &str = "Visitors";

/// Infobox labels that get a stable column name.
const RENAMES: &[(&str, &str)] = &[
    ("Location", "location"),
    ("Collection size", "collection_size"),
    ("Director", "director"),
    ("Public transit access", "public_transit_access"),
    ("Website", "website"),
    ("Architect", "architect"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Art,
    History,
    Natural,
    Culture,
    Science,
}

/// Keywords looked up (lowercase, substring) in the museum type.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Art, &["art"]),
    (Category::History, &["history"]),
    (Category::Natural, &["natural"]),
    (Category::Culture, &["culture", "archaeology"]),
    (Category::Science, &["science"]),
];

impl CategoryFlags {
    fn set(&mut self, category: Category) {
        match category {
            Category::Art => self.is_art_museum = true,
            Category::History => self.is_history_museum = true,
            Category::Natural => self.is_natural_museum = true,
            Category::Culture => self.is_culture_museum = true,
            Category::Science => self.is_science_museum = true,
        }
    }
}

/// Extract a year between 1000 and 2999 from free text.
///
/// `None` passes through. When the text holds several years the last one is
/// returned: `"1759; reopened 1857"` → `"1857"`.
///
/// # Errors
///
/// [`NormalizeError::NoYear`] when no year is found and `policy` is
/// [`YearPolicy::Fatal`]. Under [`YearPolicy::Missing`] the result is `None`.
pub fn extract_year(
    value: Option<&str>,
    policy: YearPolicy,
) -> Result<Option<String>, NormalizeError> {
    let Some(text) = value else {
        return Ok(None);
    };
    match YEAR.captures(text).and_then(|caps| caps.get(1)) {
        Some(year) => Ok(Some(year.as_str().to_string())),
        None => match policy {
            YearPolicy::Fatal => Err(NormalizeError::NoYear(text.to_string())),
            YearPolicy::Missing => {
                warn!(value = %truncate_for_log(text, 80), "No year found; treating as missing");
                Ok(None)
            }
        },
    }
}

/// Derive the five category flags from the infobox `Type` value.
///
/// A missing type leaves every flag false. Under [`CultureRule::Legacy`] any
/// present type marks the museum as a culture museum.
pub fn tag_categories(value: Option<&str>, rule: CultureRule) -> CategoryFlags {
    let mut flags = CategoryFlags::default();
    let Some(text) = value else {
        return flags;
    };

    let text = text.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            flags.set(*category);
        }
    }
    if rule == CultureRule::Legacy {
        flags.set(Category::Culture);
    }
    flags
}

/// Remove every panel label missing from at least `threshold` of the records.
///
/// A label survives only when its missing fraction is strictly below the
/// threshold. Returns the labels that were dropped.
#[instrument(level = "info", skip_all, fields(records = drafts.len(), threshold = threshold))]
pub fn prune_sparse_fields(drafts: &mut [DraftRecord], threshold: f64) -> BTreeSet<String> {
    let total = drafts.len();
    if total == 0 {
        return BTreeSet::new();
    }

    let mut present: BTreeMap<&str, usize> = BTreeMap::new();
    for draft in drafts.iter() {
        for label in draft.panel.keys() {
            *present.entry(label.as_str()).or_default() += 1;
        }
    }

    let dropped: BTreeSet<String> = present
        .into_iter()
        .filter(|(_, count)| {
            let missing = (total - count) as f64 / total as f64;
            missing >= threshold
        })
        .map(|(label, _)| label.to_string())
        .collect();

    for draft in drafts.iter_mut() {
        draft.panel.retain(|label, _| !dropped.contains(label));
    }

    info!(dropped = dropped.len(), "Pruned sparse infobox fields");
    debug!(?dropped, "Dropped fields");
    dropped
}

/// Promote a draft to a [`NormalizedRecord`].
pub fn normalize_record(
    draft: DraftRecord,
    year_policy: YearPolicy,
    culture_rule: CultureRule,
) -> Result<NormalizedRecord, NormalizeError> {
    let DraftRecord { stub, mut panel } = draft;

    let established = panel.remove(ESTABLISHED_LABEL);
    let established_year = extract_year(established.as_deref(), year_policy)?;
    let categories = tag_categories(panel.remove(TYPE_LABEL).as_deref(), culture_rule);
    let visitors_rank = panel.remove(VISITORS_LABEL);

    let fields = panel
        .into_iter()
        .map(|(label, value)| (renamed(&label).unwrap_or(label), value))
        .collect();

    Ok(NormalizedRecord {
        name: stub.name,
        city: stub.city,
        visitors: stub.visitor_count,
        link_id: stub.link_id,
        established_year,
        visitors_rank,
        categories,
        fields,
    })
}

fn renamed(label: &str) -> Option<String> {
    RENAMES
        .iter()
        .find(|(from, _)| *from == label)
        .map(|(_, to)| to.to_string())
}
