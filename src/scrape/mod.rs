// Scraping pipeline: page fetching, table extraction, and the three
// collectors (salaries, post-season teams, per-team stats).

pub mod salaries;
pub mod stats;
pub mod table;
pub mod teams;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Structural failures abort a collection run; value-level failures (a
/// malformed salary figure, an unmatched join) are absorbed upstream by
/// dropping the offending row.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("no table region matching `{locator}` found")]
    TableNotFound { locator: String },

    #[error("pagination indicator unreadable: {text:?}")]
    Pagination { text: String },

    #[error("unexpected page layout: {message}")]
    Layout { message: String },
}

// ---------------------------------------------------------------------------
// Page fetching
// ---------------------------------------------------------------------------

/// Capability to fetch one page of markup. The collectors depend on this
/// trait so tests can drive them from fixture HTML without a network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Production fetcher backed by a reqwest client with a browser user agent
/// (the salary site serves a degraded page to unknown agents).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            )
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| ScrapeError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}
