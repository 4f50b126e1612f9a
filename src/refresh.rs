//! Fetch coordinator.
//!
//! Pulls a fresh batch from the deal source, swaps it into the shared
//! state and writes it to the cache. At most one refresh runs at a
//! time; a second caller is turned away instead of queueing.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::source::DealSource;
use crate::state::SharedState;
use crate::storage::CacheStore;
use crate::types::DealError;

/// Summary of a successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    /// Items actually received.
    pub item_count: usize,
    /// Item total as reported by the API.
    pub total: u64,
    pub cached: bool,
    pub timestamp: String,
    pub elapsed_secs: f64,
    pub scrape_time_seconds: Option<f64>,
}

impl RefreshOutcome {
    pub fn status_message(&self) -> String {
        if self.cached {
            format!("Loaded {} items (cached)", self.total)
        } else {
            format!("Loaded {} items", self.total)
        }
    }

    /// Timing note shown next to the status line.
    pub fn cache_info(&self) -> String {
        if self.cached {
            format!("{:.1}s", self.elapsed_secs)
        } else {
            match self.scrape_time_seconds {
                Some(secs) if secs > 0.0 => format!("Scraped in {secs}s"),
                _ => format!("Scraped in {:.1}s", self.elapsed_secs),
            }
        }
    }
}

pub struct Refresher {
    source: Arc<dyn DealSource>,
    state: SharedState,
    store: Option<CacheStore>,
    in_flight: Mutex<()>,
}

impl Refresher {
    /// `store` of `None` disables persistence.
    pub fn new(source: Arc<dyn DealSource>, state: SharedState, store: Option<CacheStore>) -> Self {
        Self {
            source,
            state,
            store,
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn store(&self) -> Option<&CacheStore> {
        self.store.as_ref()
    }

    /// Whether a refresh is currently running.
    pub fn is_running(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Run one fetch cycle.
    ///
    /// On failure the current items stay in place and the status line
    /// reads `"Error: <message>"`. Fails fast with `RefreshInProgress`
    /// without touching state if another refresh holds the guard.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DealError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| DealError::RefreshInProgress)?;

        let source = self.source.name();
        info!(source, "Fetching deals...");
        self.state.write().await.set_status("Fetching deals...", None);

        let started = Instant::now();
        let batch = match self.source.fetch_deals().await {
            Ok(batch) => batch,
            Err(e) => {
                error!(source, error = %e, "Refresh failed, keeping cached items");
                self.state
                    .write()
                    .await
                    .set_status(format!("Error: {e}"), None);
                return Err(e);
            }
        };
        let elapsed_secs = started.elapsed().as_secs_f64();

        if let Some(store) = &self.store {
            if let Err(e) = store.save_items(&batch.items, &batch.timestamp) {
                warn!(error = %e, "Could not persist fetched items");
            }
        }

        let outcome = RefreshOutcome {
            item_count: batch.items.len(),
            total: batch.total,
            cached: batch.cached,
            timestamp: batch.timestamp.clone(),
            elapsed_secs,
            scrape_time_seconds: batch.scrape_time_seconds,
        };

        {
            let mut state = self.state.write().await;
            state.replace_items(batch);
            state.set_status(outcome.status_message(), Some(outcome.cache_info()));
        }

        info!(
            source,
            items = outcome.item_count,
            cached = outcome.cached,
            elapsed_secs = format!("{:.1}", outcome.elapsed_secs),
            "Refresh complete"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
