//! Deal sources.
//!
//! Defines the `DealSource` trait and the HTTP client for the scrape API.
//! The refresher only ever sees the trait, so tests swap in an
//! in-memory source.

pub mod scrape_api;

use async_trait::async_trait;

use crate::types::{DealBatch, DealError};

pub use scrape_api::ScrapeApiClient;

/// Anything that can produce a fresh batch of deals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealSource: Send + Sync {
    /// Fetch the full current item list.
    async fn fetch_deals(&self) -> Result<DealBatch, DealError>;

    /// Source name for logging.
    fn name(&self) -> &'static str;
}
