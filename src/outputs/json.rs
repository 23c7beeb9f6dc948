//! JSON export of the normalized dataset.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── museums.json
//! ```

use crate::models::Dataset;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

pub const DATASET_FILENAME: &str = "museums.json";

/// Write a [`Dataset`] as pretty-printed JSON.
///
/// Creates the output directory if it does not exist.
///
/// # Arguments
///
/// * `dataset` - The joined museum records and their timestamp
/// * `json_output_dir` - Directory that receives the file
///
/// # Returns
///
/// The path written, or an error if serialization, directory creation or
/// the write fails.
///
/// # Output Path
///
/// The file is written to: `{json_output_dir}/museums.json`
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_dataset(
    dataset: &Dataset,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(dataset)?;

    ensure_writable_dir(json_output_dir).await?;

    let path = PathBuf::from(json_output_dir).join(DATASET_FILENAME);
    fs::write(&path, json).await?;
    info!(path = %path.display(), records = dataset.records.len(), "Wrote JSON dataset");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryFlags, MuseumWithPopulation, NormalizedRecord};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_write_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("json");
        let dataset = Dataset {
            local_date: "2025-05-06".to_string(),
            local_time: "12:00:00".to_string(),
            source_page: "List_of_most-visited_museums".to_string(),
            records: vec![MuseumWithPopulation {
                museum: NormalizedRecord {
                    name: "British Museum".to_string(),
                    city: "London".to_string(),
                    visitors: 5_820_000,
                    link_id: Some("British_Museum".to_string()),
                    established_year: Some("1753".to_string()),
                    visitors_rank: None,
                    categories: CategoryFlags {
                        is_history_museum: true,
                        ..CategoryFlags::default()
                    },
                    fields: BTreeMap::from([("director".to_string(), "Nicholas Cullinan".to_string())]),
                },
                country: Some("United Kingdom".to_string()),
                population: Some(11_262_000),
            }],
        };

        let path = write_dataset(&dataset, out.to_str().unwrap()).await.unwrap();
        assert_eq!(path, out.join(DATASET_FILENAME));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let record = &written["records"][0];
        assert_eq!(record["name"], "British Museum");
        assert_eq!(record["director"], "Nicholas Cullinan");
        assert_eq!(record["is_history_museum"], true);
        assert_eq!(record["population"], 11_262_000);
    }
}
