//! SQLite persistence: a `city` dimension table and a `museum` fact table.
//!
//! Both tables are dropped and re-created on every run. Surrogate ids are
//! assigned in emission order starting at 1; `museum.city_id` references
//! `city.city_id`.

use crate::error::StorageError;
use crate::models::{CategoryFlags, MuseumWithPopulation};
use itertools::Itertools;
use rusqlite::{Connection, Transaction, params};
use std::collections::HashMap;
use tracing::{info, instrument};

const CREATE_CITY_TABLE: &str = "CREATE TABLE city (
    city_id INTEGER PRIMARY KEY,
    city TEXT,
    country TEXT,
    population NUMBER
)";

const CREATE_MUSEUM_TABLE: &str = "CREATE TABLE museum (
    id INTEGER PRIMARY KEY,
    name TEXT,
    city_id INTEGER,
    visitors NUMBER,
    wiki_link TEXT,
    location TEXT,
    latitude NUMBER,
    longitude NUMBER,
    collection_size TEXT,
    visitors_rank TEXT,
    director TEXT,
    public_transit_access TEXT,
    website TEXT,
    architect TEXT,
    established_year TEXT,
    is_art_museum INTEGER,
    is_history_museum INTEGER,
    is_natural_museum INTEGER,
    is_culture_museum INTEGER,
    is_science_museum INTEGER,
    FOREIGN KEY(city_id) REFERENCES city(city_id)
)";

#[derive(Debug, Clone, PartialEq)]
pub struct CityRow {
    pub city_id: i64,
    pub city: String,
    pub country: Option<String>,
    pub population: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuseumRow {
    pub id: i64,
    pub name: String,
    pub city_id: i64,
    pub visitors: u64,
    pub wiki_link: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub collection_size: Option<String>,
    pub visitors_rank: Option<String>,
    pub director: Option<String>,
    pub public_transit_access: Option<String>,
    pub website: Option<String>,
    pub architect: Option<String>,
    pub established_year: Option<String>,
    pub categories: CategoryFlags,
}

#[derive(Debug, Default)]
pub struct Tables {
    pub cities: Vec<CityRow>,
    pub museums: Vec<MuseumRow>,
}

/// Split the joined museums into city and museum rows.
pub fn build_tables(joined: &[MuseumWithPopulation]) -> Tables {
    let cities: Vec<CityRow> = joined
        .iter()
        .unique_by(|m| m.museum.city.clone())
        .zip(1..)
        .map(|(m, city_id)| CityRow {
            city_id,
            city: m.museum.city.clone(),
            country: m.country.clone(),
            population: m.population,
        })
        .collect();

    let city_ids: HashMap<&str, i64> = cities
        .iter()
        .map(|c| (c.city.as_str(), c.city_id))
        .collect();

    let museums = joined
        .iter()
        .zip(1..)
        .map(|(m, id)| {
            let record = &m.museum;
            let field = |name: &str| record.field(name).map(str::to_string);
            MuseumRow {
                id,
                name: record.name.clone(),
                city_id: city_ids[record.city.as_str()],
                visitors: record.visitors,
                wiki_link: record.link_id.clone(),
                location: field("location"),
                latitude: field("latitude"),
                longitude: field("longitude"),
                collection_size: field("collection_size"),
                visitors_rank: record.visitors_rank.clone(),
                director: field("director"),
                public_transit_access: field("public_transit_access"),
                website: field("website"),
                architect: field("architect"),
                established_year: record.established_year.clone(),
                categories: record.categories,
            }
        })
        .collect();

    Tables { cities, museums }
}

/// Re-create the database at `path` with the given tables.
#[instrument(level = "info", skip_all, fields(%path))]
pub fn write_database(path: &str, tables: &Tables) -> Result<(), StorageError> {
    let mut conn = Connection::open(path)?;
    write_tables(&mut conn, tables)?;
    info!(
        cities = tables.cities.len(),
        museums = tables.museums.len(),
        "Wrote museum database"
    );
    Ok(())
}

/// Drop, create and fill both tables in a single transaction.
pub fn write_tables(conn: &mut Connection, tables: &Tables) -> Result<(), StorageError> {
    let tx = conn.transaction()?;
    tx.execute_batch("DROP TABLE IF EXISTS museum; DROP TABLE IF EXISTS city;")?;
    tx.execute(CREATE_CITY_TABLE, [])?;
    tx.execute(CREATE_MUSEUM_TABLE, [])?;
    insert_cities(&tx, &tables.cities)?;
    insert_museums(&tx, &tables.museums)?;
    tx.commit()?;
    Ok(())
}

fn insert_cities(tx: &Transaction<'_>, cities: &[CityRow]) -> Result<(), StorageError> {
    let mut stmt =
        tx.prepare("INSERT INTO city (city_id, city, country, population) VALUES (?1, ?2, ?3, ?4)")?;
    for city in cities {
        stmt.execute(params![
            city.city_id,
            city.city,
            city.country,
            city.population.map(|p| p as i64),
        ])?;
    }
    Ok(())
}

fn insert_museums(tx: &Transaction<'_>, museums: &[MuseumRow]) -> Result<(), StorageError> {
    let mut stmt = tx.prepare(
        "INSERT INTO museum (
            id, name, city_id, visitors, wiki_link, location, latitude, longitude,
            collection_size, visitors_rank, director, public_transit_access, website,
            architect, established_year, is_art_museum, is_history_museum,
            is_natural_museum, is_culture_museum, is_science_museum
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
    )?;
    for m in museums {
        let c = &m.categories;
        stmt.execute(params![
            m.id,
            m.name,
            m.city_id,
            m.visitors as i64,
            m.wiki_link,
            m.location,
            m.latitude,
            m.longitude,
            m.collection_size,
            m.visitors_rank,
            m.director,
            m.public_transit_access,
            m.website,
            m.architect,
            m.established_year,
            c.is_art_museum,
            c.is_history_museum,
            c.is_natural_museum,
            c.is_culture_museum,
            c.is_science_museum,
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedRecord;
    use std::collections::BTreeMap;

    fn joined(name: &str, city: &str, population: Option<u64>) -> MuseumWithPopulation {
        MuseumWithPopulation {
            museum: NormalizedRecord {
                name: name.to_string(),
                city: city.to_string(),
                visitors: 1_000_000,
                link_id: Some(name.replace(' ', "_")),
                established_year: Some("1900".to_string()),
                visitors_rank: None,
                categories: CategoryFlags {
                    is_art_museum: true,
                    ..CategoryFlags::default()
                },
                fields: BTreeMap::from([
                    ("latitude".to_string(), "48.861".to_string()),
                    ("director".to_string(), "Someone".to_string()),
                ]),
            },
            country: population.map(|_| "Somewhere".to_string()),
            population,
        }
    }

    fn sample() -> Vec<MuseumWithPopulation> {
        vec![
            joined("Louvre", "Paris", Some(2_161_000)),
            joined("Tate Modern", "London", None),
            joined("Musee d'Orsay", "Paris", Some(2_161_000)),
        ]
    }

    #[test]
    fn test_build_tables_assigns_ids_in_order() {
        let tables = build_tables(&sample());

        let cities: Vec<_> = tables.cities.iter().map(|c| (c.city_id, c.city.as_str())).collect();
        assert_eq!(cities, [(1, "Paris"), (2, "London")]);

        let museums: Vec<_> = tables.museums.iter().map(|m| (m.id, m.city_id)).collect();
        assert_eq!(museums, [(1, 1), (2, 2), (3, 1)]);
        assert_eq!(tables.museums[0].director.as_deref(), Some("Someone"));
        assert_eq!(tables.museums[0].website, None);
        assert_eq!(tables.museums[1].wiki_link.as_deref(), Some("Tate_Modern"));
    }

    #[test]
    fn test_write_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        let tables = build_tables(&sample());
        write_tables(&mut conn, &tables).unwrap();

        let cities: i64 = conn
            .query_row("SELECT COUNT(*) FROM city", [], |r| r.get(0))
            .unwrap();
        assert_eq!(cities, 2);

        let (name, city, art, science, latitude): (String, String, i64, i64, f64) = conn
            .query_row(
                "SELECT m.name, c.city, m.is_art_museum, m.is_science_museum, m.latitude
                 FROM museum m JOIN city c ON c.city_id = m.city_id WHERE m.id = 3",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .unwrap();
        assert_eq!(name, "Musee d'Orsay");
        assert_eq!(city, "Paris");
        assert_eq!((art, science), (1, 0));
        assert!((latitude - 48.861).abs() < 1e-9);

        let population: Option<i64> = conn
            .query_row("SELECT population FROM city WHERE city = 'London'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(population, None);
    }

    #[test]
    fn test_write_database_replaces_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("museum_analysis.db");
        let path = path.to_str().unwrap();

        write_database(path, &build_tables(&sample())).unwrap();
        write_database(path, &build_tables(&sample()[..1])).unwrap();

        let conn = Connection::open(path).unwrap();
        let museums: i64 = conn
            .query_row("SELECT COUNT(*) FROM museum", [], |r| r.get(0))
            .unwrap();
        assert_eq!(museums, 1);
    }
}
