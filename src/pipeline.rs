//! The scrape-and-normalize pipeline.
//!
//! One call to [`run`] performs a complete pass:
//!
//! 1. **Listing**: fetch and parse the most-visited museums page
//! 2. **Panels**: fetch and parse each museum page, one at a time, in listing order
//! 3. **Merge**: zip every stub with its panel
//! 4. **Prune**: drop infobox fields that are missing almost everywhere
//! 5. **Normalize**: years, categories and label renames
//!
//! A listing that cannot be fetched aborts the run. A museum page that cannot
//! be fetched only costs that museum its panel. Parse failures always abort,
//! since they mean the page layout changed.

use crate::config::Config;
use crate::error::PipelineError;
use crate::models::{AttributePanel, DraftRecord, EntityStub, NormalizedRecord};
use crate::normalize::{normalize_record, prune_sparse_fields};
use crate::scrapers::PageSource;
use crate::scrapers::listing::parse_listing;
use crate::scrapers::panel::parse_panel;
use chrono::Local;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, warn};

/// Run the whole pipeline against `source`.
#[instrument(
    name = "pipeline_run",
    level = "info",
    skip_all,
    fields(listing = %config.listing_page, started_at = %Local::now().to_rfc3339())
)]
pub async fn run<S: PageSource>(
    source: &S,
    config: &Config,
) -> Result<Vec<NormalizedRecord>, PipelineError> {
    let stubs = fetch_listing(source, config).await?;

    let mut drafts: Vec<DraftRecord> = stream::iter(stubs)
        .then(|stub| async move {
            let panel = fetch_panel(source, &stub).await?;
            Ok::<_, PipelineError>(DraftRecord { stub, panel })
        })
        .try_collect()
        .await?;
    let with_panel = drafts.iter().filter(|d| !d.panel.is_empty()).count();
    info!(count = drafts.len(), with_panel, "Fetched museum panels");

    prune_sparse_fields(&mut drafts, config.prune_threshold);

    let records = drafts
        .into_iter()
        .map(|draft| {
            let museum = draft.stub.name.clone();
            normalize_record(draft, config.year_policy, config.culture_rule)
                .map_err(|source| PipelineError::Normalize { museum, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = records.len(), "Normalized museum records");
    Ok(records)
}

#[instrument(level = "info", skip_all)]
async fn fetch_listing<S: PageSource>(
    source: &S,
    config: &Config,
) -> Result<Vec<EntityStub>, PipelineError> {
    let html = source
        .fetch_page(&config.listing_page)
        .await
        .map_err(PipelineError::ListingUnavailable)?;

    parse_listing(&html, &config.skip_anchor).map_err(|source| PipelineError::Parse {
        page: config.listing_page.clone(),
        source,
    })
}

/// Panel of one museum; empty when it has no page or the page is unavailable.
#[instrument(level = "info", skip_all, fields(museum = %stub.name))]
async fn fetch_panel<S: PageSource>(
    source: &S,
    stub: &EntityStub,
) -> Result<AttributePanel, PipelineError> {
    let Some(page) = stub.link_id.as_deref() else {
        debug!("No page for museum; empty panel");
        return Ok(AttributePanel::new());
    };

    let html = match source.fetch_page(page).await {
        Ok(html) => html,
        Err(e) => {
            warn!(%page, error = %e, "Museum page unavailable; empty panel");
            return Ok(AttributePanel::new());
        }
    };

    parse_panel(&html).map_err(|source| PipelineError::Parse {
        page: page.to_string(),
        source,
    })
}
