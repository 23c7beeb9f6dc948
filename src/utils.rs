//! Small text and filesystem helpers shared by the scrapers and outputs.
//!
//! - Cleaning scraped cell text (footnotes, non-ASCII artifacts, whitespace)
//! - Truncating values for log lines
//! - Validating output directories

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Footnote markers such as `[5]`, `[a]` or `[note 2]`.
static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]{1,12}\]").unwrap());

/// Concatenated text of an element and all its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Drop every character outside 7-bit ASCII.
///
/// Scraped infobox values carry non-breaking spaces, thin spaces and
/// similar artifacts; they are removed rather than transliterated.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_non_ascii("8\u{a0}November 1793"), "8November 1793");
/// ```
pub fn strip_non_ascii(s: &str) -> String {
    s.chars().filter(char::is_ascii).collect()
}

/// Remove footnote markers and surrounding whitespace from a table cell.
pub fn clean_cell_text(s: &str) -> String {
    FOOTNOTE.replace_all(s, "").trim().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("Musée du Louvre", 4);
        assert_eq!(result, "Mus…(+13 bytes)");
    }

    #[test]
    fn test_strip_non_ascii() {
        assert_eq!(strip_non_ascii("Paris\u{a0}France"), "ParisFrance");
        assert_eq!(strip_non_ascii("Musée d'Orsay"), "Muse d'Orsay");
        assert_eq!(strip_non_ascii("plain"), "plain");
    }

    #[test]
    fn test_clean_cell_text() {
        assert_eq!(clean_cell_text(" Louvre[5]\n"), "Louvre");
        assert_eq!(clean_cell_text("9,600,000[a][note 2]"), "9,600,000");
        assert_eq!(clean_cell_text("Vatican City"), "Vatican City");
    }

    #[test]
    fn test_element_text_joins_descendants() {
        let html = Html::parse_fragment("<p>Hello <b>big</b> world</p>");
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "Hello big world");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        let nested = nested.to_str().unwrap();
        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
