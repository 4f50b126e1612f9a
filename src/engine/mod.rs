//! Deal engine: price parsing, brand tiers, scoring, filtering,
//! pagination and aggregate statistics.
//!
//! Everything in here is synchronous and pure. State the engine reads
//! (category averages, favourite brands) is passed in explicitly by
//! the caller, normally [`crate::state::AppState`].

pub mod facets;
pub mod filter;
pub mod pagination;
pub mod price;
pub mod scoring;
pub mod stats;
pub mod tiers;

pub use facets::Facets;
pub use filter::{apply_filters, filter_and_sort, sort_items};
pub use pagination::{page_slice, total_pages, PAGE_SIZE};
pub use price::parse_price;
pub use scoring::{deal_score, CategoryAverages, ScoredItem};
pub use stats::{ChartData, DealStats};
pub use tiers::classify_tier;
