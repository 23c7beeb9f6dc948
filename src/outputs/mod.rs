//! Output writers for a finished run.
//!
//! - [`json`]: the normalized, population-joined dataset as `museums.json`
//! - [`sqlite`]: `city` and `museum` tables in a SQLite database
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── museums.json
//!
//! museum_analysis.db
//! ├── city    (city_id, city, country, population)
//! └── museum  (id, name, city_id → city, visitors, ...)
//! ```

pub mod json;
pub mod sqlite;
