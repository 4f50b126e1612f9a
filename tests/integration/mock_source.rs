//! Mock deal source for integration testing.
//!
//! Provides a deterministic `DealSource` that hands out queued batches
//! in order, in memory with no network. A gate can hold a fetch open so
//! tests can observe overlapping refreshes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use discount_finder::source::DealSource;
use discount_finder::types::{DealBatch, DealError, Item, Source};

pub struct MockSource {
    responses: Mutex<VecDeque<Result<DealBatch, DealError>>>,
    calls: Mutex<usize>,
    /// When set, each fetch signals `started` then waits on `release`.
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
            gate: None,
        }
    }

    /// A source whose fetches block until `release` is notified.
    /// `started` is notified as each fetch begins.
    pub fn gated(started: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            gate: Some((started, release)),
            ..Self::new()
        }
    }

    pub fn push_ok(self, items: Vec<Item>, cached: bool) -> Self {
        let batch = DealBatch {
            total: items.len() as u64,
            items,
            timestamp: "2026-02-21T12:00:00".to_string(),
            cached,
            scrape_time_seconds: if cached { None } else { Some(30.0) },
        };
        self.responses.lock().unwrap().push_back(Ok(batch));
        self
    }

    pub fn push_err(self, err: DealError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DealSource for MockSource {
    async fn fetch_deals(&self) -> Result<DealBatch, DealError> {
        *self.calls.lock().unwrap() += 1;
        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DealError::Unsuccessful("No more mock responses".into())))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Fixture items
// ---------------------------------------------------------------------------

pub fn item(source: Source, brand: &str, name: &str, category: Option<&str>, current: &str, original: &str, discount: Option<f64>) -> Item {
    Item {
        source,
        name: name.to_string(),
        category: category.map(String::from),
        brand: Some(brand.to_string()),
        current_price: current.to_string(),
        original_price: original.to_string(),
        discount_percent: discount,
        url: Some(format!("https://example.com/{}", name.to_lowercase().replace(' ', "-"))),
        scraped_at: Some("2026-02-21T11:58:00".to_string()),
    }
}

/// A small mixed catalogue across every retailer and tier.
pub fn catalogue() -> Vec<Item> {
    vec![
        item(Source::TheIconic, "Hugo Boss", "Slim Fit Shirt", Some("Shirts"), "$89.95", "$179.95", Some(50.0)),
        item(Source::Asos, "ASOS DESIGN", "Cargo Pants", Some("Pants"), "$30.00", "$60.00", Some(50.0)),
        item(Source::Myer, "Gucci", "Leather Belt", Some("Accessories"), "$450.00", "$900.00", Some(50.0)),
        item(Source::JbHiFi, "Unknown", "Bluetooth Speaker", None, "$99.00", "N/A", None),
        item(Source::DavidJones, "Zara", "Basic Tee", Some("T-Shirts & Singlets"), "$15.00", "$25.00", Some(40.0)),
        item(Source::Other("Uniqlo AU".into()), "Uniqlo", "Heattech Crew", Some("T-Shirts & Singlets"), "$19.90", "$29.90", Some(33.0)),
    ]
}
