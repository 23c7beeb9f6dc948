//! HTTP [`PageSource`] backed by Wikipedia.
//!
//! Titles are percent-encoded and joined onto the configured base URL, so
//! `Musée_d'Orsay` becomes `https://en.wikipedia.org/wiki/Mus%C3%A9e_d%27Orsay`.

use super::PageSource;
use crate::config::Config;
use crate::error::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct WikipediaSource {
    client: Client,
    base_url: Url,
}

impl WikipediaSource {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self { client, base_url })
    }

    /// Absolute URL of the page with the given title.
    pub fn page_url(&self, page: &str) -> Result<Url, FetchError> {
        let encoded = urlencoding::encode(page);
        self.base_url
            .join(&encoded)
            .map_err(|source| FetchError::Url {
                page: page.to_string(),
                source,
            })
    }
}

impl PageSource for WikipediaSource {
    #[instrument(level = "info", skip_all, fields(%page))]
    async fn fetch_page(&self, page: &str) -> Result<String, FetchError> {
        let url = self.page_url(page)?;
        debug!(%url, "Requesting page");

        let http_err = |source| FetchError::Http {
            page: page.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(http_err)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(page.to_string())),
            status if !status.is_success() => Err(FetchError::Status {
                page: page.to_string(),
                status: status.as_u16(),
            }),
            _ => {
                let html = response.text().await.map_err(http_err)?;
                info!(bytes = html.len(), "Fetched page");
                Ok(html)
            }
        }
    }
}
