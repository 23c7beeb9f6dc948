//! City populations from a world cities CSV, joined onto museum records.
//!
//! The CSV needs `city`, `country` and `population` columns; anything else
//! (lat/lng, admin names, ids) is ignored. Files such as the simplemaps
//! `worldcities.csv` are sorted by descending population and repeat common
//! city names, so only the most populous row of each name is kept.

use crate::error::PopulationError;
use crate::models::{CityPopulation, MuseumWithPopulation, NormalizedRecord};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use tracing::{debug, info, instrument};

/// Spellings in the population file → spellings used on the museum listing.
const CITY_RENAMES: &[(&str, &str)] = &[
    ("New York", "New York City"),
    ("Washington", "Washington, D.C."),
    ("Xi’an", "Xi'an"),
];

#[derive(Debug, Deserialize)]
struct WorldCityRow {
    city: String,
    country: String,
    population: Option<f64>,
}

/// Load the reference city populations from a world cities CSV.
///
/// Rows without a population are skipped. Each city name keeps its most
/// populous row, and the listing's spellings (see `CITY_RENAMES`) replace
/// the file's.
///
/// # Arguments
///
/// * `path` - Path to the CSV, which needs `city`, `country` and `population` columns
///
/// # Returns
///
/// The cities sorted by descending population, or [`PopulationError::Read`]
/// if the file cannot be opened or a row does not deserialize.
#[instrument(level = "info", skip_all, fields(%path))]
pub fn load_reference_cities(path: &str) -> Result<Vec<CityPopulation>, PopulationError> {
    let read_err = |source| PopulationError::Read {
        path: path.to_string(),
        source,
    };
    let reader = csv::Reader::from_path(path).map_err(read_err)?;
    let cities = read_world_cities(reader).map_err(read_err)?;
    let mut cities = dedupe_cities(cities);
    apply_city_renames(&mut cities);
    // A rename can land on a name the file already has.
    let cities = dedupe_cities(cities);
    info!(count = cities.len(), "Loaded reference city populations");
    Ok(cities)
}

/// Parse every row with a population.
pub fn read_world_cities<R: io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<CityPopulation>, csv::Error> {
    let mut cities = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<WorldCityRow>() {
        let row = row?;
        let Some(population) = row.population else {
            skipped += 1;
            continue;
        };
        cities.push(CityPopulation {
            city: row.city,
            country: row.country,
            population: population.round() as u64,
        });
    }
    debug!(rows = cities.len(), skipped, "Read world cities");
    Ok(cities)
}

/// Keep the most populous row of every city name.
pub fn dedupe_cities(mut cities: Vec<CityPopulation>) -> Vec<CityPopulation> {
    cities.sort_by(|a, b| b.population.cmp(&a.population));
    cities
        .into_iter()
        .unique_by(|c| c.city.clone())
        .collect()
}

pub fn apply_city_renames(cities: &mut [CityPopulation]) {
    for city in cities.iter_mut() {
        if let Some((_, to)) = CITY_RENAMES.iter().find(|(from, _)| *from == city.city) {
            city.city = to.to_string();
        }
    }
}

/// Left join on the exact city name. Museums without a match keep `None`.
///
/// When `cities` repeats a name, the most populous row is joined.
#[instrument(level = "info", skip_all, fields(museums = records.len(), cities = cities.len()))]
pub fn join_population(
    records: Vec<NormalizedRecord>,
    cities: &[CityPopulation],
) -> Vec<MuseumWithPopulation> {
    let mut by_name: HashMap<&str, &CityPopulation> = HashMap::with_capacity(cities.len());
    for c in cities {
        by_name
            .entry(c.city.as_str())
            .and_modify(|kept| {
                if c.population > kept.population {
                    *kept = c;
                }
            })
            .or_insert(c);
    }

    let joined: Vec<MuseumWithPopulation> = records
        .into_iter()
        .map(|museum| {
            let city = by_name.get(museum.city.as_str());
            MuseumWithPopulation {
                country: city.map(|c| c.country.clone()),
                population: city.map(|c| c.population),
                museum,
            }
        })
        .collect();

    let matched = joined.iter().filter(|m| m.population.is_some()).count();
    info!(matched, unmatched = joined.len() - matched, "Joined city populations");
    joined
}
