use crate::parser::{ParseError, parse_products};
use crate::types::Record;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Failed to fetch page: {url} (status {status})")]
    Fetch { url: String, status: StatusCode },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Single blocking GET. Anything other than a 2xx status is a
    /// [`ScraperError::Fetch`] carrying the requested URL.
    pub fn fetch_page(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        log::info!("Fetching {}...", url);
        let response = self
            .client
            .get(url)
            .send()
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Fetch {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes()?;
        log::debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }

    pub fn scrape(&self, url: &str) -> Result<Vec<Record>, ScraperError> {
        let body = self.fetch_page(url)?;
        let html = String::from_utf8_lossy(&body);
        Ok(parse_products(&html)?)
    }
}
