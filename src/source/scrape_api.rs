//! Scrape API client.
//!
//! The backend scrapes the retailers and answers a single GET with the
//! whole item list, optionally served from its own cache:
//!
//! ```json
//! { "success": true, "items": [...], "timestamp": "...", "cached": true,
//!   "total": 812, "scrape_time_seconds": 41.3 }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::DealSource;
use crate::types::{DealBatch, DealError, ScrapeResponse};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/scrape";
const SOURCE_NAME: &str = "scrape-api";
const DEFAULT_USER_AGENT: &str = "discount-finder/0.1.0";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ScrapeApiClient {
    http: Client,
    url: String,
}

impl ScrapeApiClient {
    /// Build a client for `url`. A full scrape can take minutes, so the
    /// timeout should be generous.
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .context("Failed to build HTTP client for scrape API")?;

        Ok(Self { http, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decode a response body. Split out so the payload handling is
    /// testable without a server.
    pub fn parse_body(body: &str) -> Result<DealBatch, DealError> {
        let resp: ScrapeResponse =
            serde_json::from_str(body).map_err(|e| DealError::Decode(e.to_string()))?;
        if let Some(age) = resp.cache_age_seconds {
            debug!(cache_age_seconds = age, "Scrape API served from cache");
        }
        resp.into_batch()
    }
}

#[async_trait]
impl DealSource for ScrapeApiClient {
    async fn fetch_deals(&self) -> Result<DealBatch, DealError> {
        debug!(url = %self.url, "Fetching deals");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DealError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "Scrape API returned error status");
            return Err(DealError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DealError::Http(e.to_string()))?;
        let batch = Self::parse_body(&body)?;

        info!(
            items = batch.items.len(),
            total = batch.total,
            cached = batch.cached,
            scrape_time_seconds = ?batch.scrape_time_seconds,
            "Deals fetched"
        );
        Ok(batch)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
