//! Wikipedia scraping: page retrieval plus the two page parsers.
//!
//! | Module | Input | Output |
//! |--------|-------|--------|
//! | [`wikipedia`] | page title | raw HTML |
//! | [`listing`] | most-visited museums page | `Vec<EntityStub>` |
//! | [`panel`] | one museum page | `AttributePanel` |
//!
//! The parsers are pure functions over HTML strings; only [`PageSource`]
//! implementations touch the network, which keeps the parsers testable with
//! inline fixtures.

pub mod listing;
pub mod panel;
pub mod wikipedia;

use crate::error::FetchError;

/// Something that can hand back the HTML of a page by title.
pub trait PageSource {
    /// Fetch the rendered HTML of `page`.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`] when the title does not resolve; other
    /// variants for transport or status failures.
    async fn fetch_page(&self, page: &str) -> Result<String, FetchError>;
}
