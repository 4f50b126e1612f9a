//! Application state shared by the refresh loop and the dashboard.
//!
//! Holds the current item list and everything derived from it. The
//! engine functions stay pure; this type owns their inputs and is the
//! only place they are mutated.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::engine::facets::Facets;
use crate::engine::filter::filter_and_sort;
use crate::engine::pagination::{navigate, page_slice, PageInfo, PAGE_SIZE};
use crate::engine::scoring::{CategoryAverages, ScoredItem};
use crate::engine::stats::{ChartData, DealStats};
use crate::types::{parse_timestamp, DealBatch, FilterConfig, Item};

/// State handle shared across tasks.
pub type SharedState = Arc<RwLock<AppState>>;

// ---------------------------------------------------------------------------
// Favourite brands
// ---------------------------------------------------------------------------

/// User-chosen brands, in the order they were added. Never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteBrands(Vec<String>);

impl FavoriteBrands {
    /// Build from a list, dropping repeats after the first occurrence.
    pub fn from_vec(brands: Vec<String>) -> Self {
        let mut favorites = Self::default();
        for brand in brands {
            favorites.add(&brand);
        }
        favorites
    }

    /// Add `brand` if it is not already present. Returns true if added.
    pub fn add(&mut self, brand: &str) -> bool {
        if self.contains(brand) {
            return false;
        }
        self.0.push(brand.to_string());
        true
    }

    /// Remove `brand`. Returns true if it was present.
    pub fn remove(&mut self, brand: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|b| b != brand);
        self.0.len() != before
    }

    /// Flip membership of `brand`. Returns the new membership.
    pub fn toggle(&mut self, brand: &str) -> bool {
        if self.remove(brand) {
            false
        } else {
            self.add(brand)
        }
    }

    pub fn contains(&self, brand: &str) -> bool {
        self.0.iter().any(|b| b == brand)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One rendered page of the filtered, sorted list.
#[derive(Debug, Clone, Serialize)]
pub struct DealPage {
    pub items: Vec<ScoredItem>,
    #[serde(flatten)]
    pub info: PageInfo,
}

/// Header status line.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub item_count: usize,
    pub last_updated: Option<String>,
    pub status: Option<String>,
    pub cache_info: Option<String>,
    pub current_page: usize,
    pub favorites: usize,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppState {
    items: Vec<Item>,
    averages: CategoryAverages,
    favorites: FavoriteBrands,
    last_updated: Option<String>,
    current_page: usize,
    /// Selection the stored page belongs to.
    filter: FilterConfig,
    status: Option<String>,
    cache_info: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            averages: CategoryAverages::default(),
            favorites: FavoriteBrands::default(),
            last_updated: None,
            current_page: 1,
            filter: FilterConfig::default(),
            status: None,
            cache_info: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from the on-disk cache at startup.
    pub fn restore(items: Vec<Item>, last_updated: Option<String>, favorites: FavoriteBrands) -> Self {
        let mut state = Self {
            favorites,
            ..Self::default()
        };
        state.set_items(items, last_updated);
        state.status = state.last_updated_message();
        info!(
            items = state.items.len(),
            categories = state.averages.len(),
            favorites = state.favorites.len(),
            "State restored from cache"
        );
        state
    }

    /// Swap in a freshly fetched batch. Averages are recomputed and the
    /// page resets to 1; the previous list is dropped whole.
    pub fn replace_items(&mut self, batch: DealBatch) {
        self.set_items(batch.items, Some(batch.timestamp));
        info!(
            items = self.items.len(),
            categories = self.averages.len(),
            "Item list replaced"
        );
    }

    fn set_items(&mut self, items: Vec<Item>, last_updated: Option<String>) {
        self.averages = CategoryAverages::from_items(&items);
        self.items = items;
        self.last_updated = last_updated;
        self.current_page = 1;
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn averages(&self) -> &CategoryAverages {
        &self.averages
    }

    pub fn favorites(&self) -> &FavoriteBrands {
        &self.favorites
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The selection the stored page was reached under.
    pub fn active_filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>, cache_info: Option<String>) {
        self.status = Some(status.into());
        self.cache_info = cache_info;
    }

    /// `"Last updated: ..."` for the stored timestamp, if it parses.
    pub fn last_updated_message(&self) -> Option<String> {
        let ts = parse_timestamp(self.last_updated.as_deref()?)?;
        Some(format!("Last updated: {}", ts.format("%Y-%m-%d %H:%M:%S UTC")))
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            item_count: self.items.len(),
            last_updated: self.last_updated.clone(),
            status: self.status.clone(),
            cache_info: self.cache_info.clone(),
            current_page: self.current_page,
            favorites: self.favorites.len(),
        }
    }

    // -- Queries ---------------------------------------------------------

    /// Filtered and sorted items.
    pub fn filtered(&self, cfg: &FilterConfig) -> Vec<&Item> {
        filter_and_sort(&self.items, cfg, &self.favorites, &self.averages)
    }

    /// Page `page` of the filtered list. Without an explicit page this is
    /// the stored page, or page 1 if `cfg` differs from the active selection.
    pub fn view(&self, cfg: &FilterConfig, page: Option<usize>) -> DealPage {
        let filtered = self.filtered(cfg);
        let page = page.unwrap_or(if *cfg == self.filter { self.current_page } else { 1 });
        let info = PageInfo::new(page, filtered.len(), PAGE_SIZE);
        let items = page_slice(&filtered, info.page, PAGE_SIZE)
            .iter()
            .map(|item| {
                let is_favorite = item
                    .brand
                    .as_deref()
                    .map(|b| self.favorites.contains(b))
                    .unwrap_or(false);
                ScoredItem::new(item, &self.averages, is_favorite)
            })
            .collect();
        DealPage { items, info }
    }

    pub fn stats(&self, cfg: &FilterConfig) -> DealStats {
        DealStats::compute(&self.filtered(cfg), &self.averages)
    }

    pub fn charts(&self, cfg: &FilterConfig) -> ChartData {
        ChartData::compute(&self.filtered(cfg), &self.averages)
    }

    pub fn facets(&self) -> Facets {
        Facets::from_items(&self.items)
    }

    // -- Mutations -------------------------------------------------------

    /// Make `cfg` the active selection. Any change goes back to page 1.
    fn select_filter(&mut self, cfg: &FilterConfig) {
        if self.filter != *cfg {
            debug!(from = self.current_page, "Filters changed, back to page 1");
            self.filter = cfg.clone();
            self.current_page = 1;
        }
    }

    /// Listing entry point: adopt `cfg` as the active selection, then
    /// return the requested page (or the stored one).
    pub fn show(&mut self, cfg: &FilterConfig, page: Option<usize>) -> DealPage {
        self.select_filter(cfg);
        self.view(cfg, page)
    }

    /// Move the stored page by `delta`, clamped to the filtered list.
    pub fn navigate(&mut self, delta: i64, cfg: &FilterConfig) -> DealPage {
        self.select_filter(cfg);
        let total = PageInfo::new(1, self.filtered(cfg).len(), PAGE_SIZE).total_pages;
        self.current_page = navigate(self.current_page, delta, total);
        debug!(page = self.current_page, total, "Page changed");
        self.view(cfg, None)
    }

    /// Flip a favourite brand. Returns the new membership.
    pub fn toggle_favorite(&mut self, brand: &str) -> bool {
        let now = self.favorites.toggle(brand);
        info!(brand, favorite = now, "Favourite toggled");
        now
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
