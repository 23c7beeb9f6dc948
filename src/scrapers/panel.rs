//! Parser for the infobox panel of a single museum page.
//!
//! Infoboxes are free-form: each museum picks its own set of rows. Every
//! `th`/`td` row becomes one entry of the [`AttributePanel`] under the
//! header text as written on the page. The `Coordinates` row is the one
//! exception; it is split into `latitude` and `longitude`.

use crate::error::ParseError;
use crate::models::AttributePanel;
use crate::utils::{element_text, strip_non_ascii};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

const COORDINATES_LABEL: &str = "Coordinates";
const COORDINATES_SEPARATOR: &str = "; ";

/// Parse a museum page into its infobox fields.
///
/// Every `th`/`td` row of the infobox becomes one entry keyed by the header
/// text. A `Coordinates` row is split into `latitude` and `longitude`.
///
/// # Arguments
///
/// * `html` - Full HTML of the museum's page
///
/// # Returns
///
/// The panel, empty when the page has no `table.infobox.vcard`, or
/// [`ParseError::StructuralMismatch`] when the coordinates do not split
/// into exactly two parts.
#[instrument(level = "debug", skip_all)]
pub fn parse_panel(html: &str) -> Result<AttributePanel, ParseError> {
    let document = Html::parse_document(html);
    let infobox_selector = Selector::parse("table.infobox.vcard").unwrap();

    let Some(infobox) = document.select(&infobox_selector).next() else {
        debug!("Page has no infobox");
        return Ok(AttributePanel::new());
    };

    let row_selector = Selector::parse("tr").unwrap();
    let header_selector = Selector::parse("th").unwrap();
    let value_selector = Selector::parse("td").unwrap();

    let mut panel = AttributePanel::new();
    for row in infobox.select(&row_selector) {
        // No header, no data.
        let Some(header) = row.select(&header_selector).next() else {
            continue;
        };
        let label = element_text(header).trim().to_string();

        if label == COORDINATES_LABEL {
            let (latitude, longitude) = split_coordinates(row)?;
            panel.insert("latitude".to_string(), latitude);
            panel.insert("longitude".to_string(), longitude);
            continue;
        }

        let Some(value) = row.select(&value_selector).next() else {
            continue;
        };
        let value = strip_non_ascii(&element_text(value)).trim().to_string();
        panel.insert(label, value);
    }

    debug!(fields = panel.len(), "Parsed infobox");
    Ok(panel)
}

/// Split the geo marker of a coordinates row into latitude and longitude.
///
/// The marker is the `span.geo` text when present (`"40.7794; -73.9632"`),
/// otherwise the value cell text.
fn split_coordinates(row: ElementRef<'_>) -> Result<(String, String), ParseError> {
    let geo_selector = Selector::parse("span.geo").unwrap();
    let value_selector = Selector::parse("td").unwrap();

    let marker = row
        .select(&geo_selector)
        .next()
        .or_else(|| row.select(&value_selector).next())
        .map(element_text)
        .ok_or_else(|| {
            ParseError::StructuralMismatch("coordinates row has no value".to_string())
        })?;

    let parts: Vec<&str> = marker.trim().split(COORDINATES_SEPARATOR).collect();
    match parts.as_slice() {
        [latitude, longitude] => Ok((latitude.to_string(), longitude.to_string())),
        _ => Err(ParseError::StructuralMismatch(format!(
            "coordinates `{}` do not split into latitude and longitude",
            marker.trim()
        ))),
    }
}
