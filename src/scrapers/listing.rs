//! Parser for the "List of most-visited museums" page.
//!
//! The museum table is the first `table.wikitable` on the page. Each data
//! row yields one [`EntityStub`] built from its first three cells (museum,
//! city, visitors); the fourth "year reported" cell is ignored.
//!
//! # Link handling
//!
//! The first `a[href]` of a row decides how the row is treated:
//!
//! | Link | Result |
//! |------|--------|
//! | the configured citation anchor (e.g. `#cite_note-13`) | row skipped |
//! | red link (`redlink=1` or class `new`) | stub with `link_id = None` |
//! | `/wiki/Title` | stub with `link_id = Some("Title")` |
//! | none at all | [`ParseError::StructuralMismatch`] |

use crate::error::ParseError;
use crate::models::EntityStub;
use crate::utils::{clean_cell_text, element_text};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

/// Parse the listing page into stubs, in table order.
///
/// # Arguments
///
/// * `html` - Full HTML of the most-visited museums page
/// * `skip_anchor` - Link target of the citation row to leave out
///
/// # Returns
///
/// One [`EntityStub`] per data row, or [`ParseError::StructuralMismatch`]
/// when there is no table, a row has no link, fewer than three cells, or no
/// visitor count.
#[instrument(level = "info", skip_all, fields(%skip_anchor))]
pub fn parse_listing(html: &str, skip_anchor: &str) -> Result<Vec<EntityStub>, ParseError> {
    let document = Html::parse_document(html);
    let table = primary_table(&document).ok_or_else(|| {
        ParseError::StructuralMismatch("listing page has no table".to_string())
    })?;

    let row_selector = Selector::parse("tr").unwrap();
    let data_cell_selector = Selector::parse("td").unwrap();
    let cell_selector = Selector::parse("td, th").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut stubs = Vec::new();
    for (row_index, row) in table.select(&row_selector).enumerate() {
        if row.select(&data_cell_selector).next().is_none() {
            debug!(row_index, "Skipping header row");
            continue;
        }

        let link = row.select(&link_selector).next().ok_or_else(|| {
            ParseError::StructuralMismatch(format!("listing row {row_index} has no hyperlink"))
        })?;
        let href = link.value().attr("href").unwrap_or_default();

        if href.eq_ignore_ascii_case(skip_anchor) {
            debug!(row_index, %href, "Skipping citation row");
            continue;
        }

        let link_id = if is_red_link(link, href) {
            info!(row_index, %href, "Red link found; museum has no page");
            None
        } else {
            Some(link_id_from_href(href))
        };

        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| clean_cell_text(&element_text(cell)))
            .collect();
        let [name, city, visitors, ..] = cells.as_slice() else {
            return Err(ParseError::StructuralMismatch(format!(
                "listing row {row_index} has {} cells, expected at least 3",
                cells.len()
            )));
        };

        stubs.push(EntityStub {
            name: name.clone(),
            city: city.clone(),
            visitor_count: parse_visitor_count(visitors).ok_or_else(|| {
                ParseError::StructuralMismatch(format!(
                    "listing row {row_index} has no visitor count in `{visitors}`"
                ))
            })?,
            link_id,
        });
    }

    info!(count = stubs.len(), "Parsed museum listing");
    Ok(stubs)
}

fn primary_table(document: &Html) -> Option<ElementRef<'_>> {
    let wikitable = Selector::parse("table.wikitable").unwrap();
    let any_table = Selector::parse("table").unwrap();
    document
        .select(&wikitable)
        .next()
        .or_else(|| document.select(&any_table).next())
}

fn is_red_link(link: ElementRef<'_>, href: &str) -> bool {
    let has_new_class = link
        .value()
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == "new"));
    has_new_class || href.to_ascii_lowercase().contains("redlink=1")
}

/// Page title from a link target: `/wiki/Mus%C3%A9e_d%27Orsay#History` → `Musée_d'Orsay`.
pub fn link_id_from_href(href: &str) -> String {
    let path = href.split(['#', '?']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string());
    match decoded.rfind("/wiki/") {
        Some(idx) => decoded[idx + "/wiki/".len()..].to_string(),
        None => decoded.rsplit('/').next().unwrap_or_default().to_string(),
    }
}

/// Digits of a visitor count cell: `"9,600,000"` → `9600000`.
fn parse_visitor_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIP: &str = "#cite_note-13";

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table class="wikitable sortable">
              <tr><th>Name</th><th>City</th><th>Visitors<a href="{SKIP}">[13]</a></th><th>Year</th></tr>
              {rows}
            </table>
            <table class="navbox"><tr><td><a href="/wiki/Other">Other</a></td></tr></table>
            </body></html>"#
        )
    }

    #[test]
    fn test_valid_dead_and_citation_rows() {
        let html = page(
            r##"
            <tr><td><a href="/wiki/Louvre">Louvre</a></td><td>Paris</td><td>8,700,000</td><td>2022</td></tr>
            <tr><td><a href="/w/index.php?title=Some_Museum&amp;action=edit&amp;redlink=1" class="new">Some Museum</a></td><td>Beijing</td><td>3,000,000</td><td>2022</td></tr>
            <tr><td><a href="#cite_note-13">[13]</a></td><td></td><td></td><td></td></tr>
            "##,
        );

        let stubs = parse_listing(&html, SKIP).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].name, "Louvre");
        assert_eq!(stubs[0].link_id.as_deref(), Some("Louvre"));
        assert_eq!(stubs[0].visitor_count, 8_700_000);
        assert_eq!(stubs[1].name, "Some Museum");
        assert_eq!(stubs[1].city, "Beijing");
        assert_eq!(stubs[1].link_id, None);
    }

    #[test]
    fn test_order_is_preserved() {
        let html = page(
            r#"
            <tr><td><a href="/wiki/A">A</a></td><td>X</td><td>3</td><td>2022</td></tr>
            <tr><td><a href="/wiki/B">B</a></td><td>Y</td><td>2</td><td>2022</td></tr>
            <tr><td><a href="/wiki/C">C</a></td><td>Z</td><td>1</td><td>2022</td></tr>
            "#,
        );
        let names: Vec<_> = parse_listing(&html, SKIP)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_skip_anchor_is_case_insensitive() {
        let html = page(
            r##"<tr><td><a href="#Cite_Note-13">[13]</a></td><td>-</td><td>-</td><td>-</td></tr>"##,
        );
        assert!(parse_listing(&html, SKIP).unwrap().is_empty());
    }

    #[test]
    fn test_red_link_detected_by_query_alone() {
        let html = page(
            r#"<tr><td><a href="/w/index.php?title=X&amp;redlink=1">X</a></td><td>Y</td><td>10</td><td>2022</td></tr>"#,
        );
        let stubs = parse_listing(&html, SKIP).unwrap();
        assert_eq!(stubs[0].link_id, None);
    }

    #[test]
    fn test_non_ascii_names_and_footnotes() {
        let html = page(
            r#"<tr><td><a href="/wiki/Mus%C3%A9e_d%27Orsay">Musée d'Orsay</a><sup>[a]</sup></td><td>Paris</td><td>3,270,000[5]</td><td>2022</td></tr>"#,
        );
        let stubs = parse_listing(&html, SKIP).unwrap();
        assert_eq!(stubs[0].name, "Musée d'Orsay");
        assert_eq!(stubs[0].link_id.as_deref(), Some("Musée_d'Orsay"));
        assert_eq!(stubs[0].visitor_count, 3_270_000);
    }

    #[test]
    fn test_row_without_link_is_structural_mismatch() {
        let html = page(r#"<tr><td>Nameless</td><td>Nowhere</td><td>1</td><td>2022</td></tr>"#);
        let err = parse_listing(&html, SKIP).unwrap_err();
        assert!(matches!(err, ParseError::StructuralMismatch(_)));
    }

    #[test]
    fn test_row_without_visitor_digits_is_structural_mismatch() {
        let html = page(
            r#"<tr><td><a href="/wiki/A">A</a></td><td>X</td><td>n/a</td><td>2022</td></tr>"#,
        );
        assert!(parse_listing(&html, SKIP).is_err());
    }

    #[test]
    fn test_page_without_table() {
        assert!(parse_listing("<html><body><p>nothing</p></body></html>", SKIP).is_err());
    }

    #[test]
    fn test_link_id_from_href() {
        assert_eq!(link_id_from_href("/wiki/Louvre"), "Louvre");
        assert_eq!(
            link_id_from_href("https://en.wikipedia.org/wiki/British_Museum#History"),
            "British_Museum"
        );
        assert_eq!(link_id_from_href("/wiki/AC%2FDC"), "AC/DC");
        assert_eq!(link_id_from_href("./Tate_Modern"), "Tate_Modern");
    }
}
