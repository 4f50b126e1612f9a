//! Filter and sort pipeline.
//!
//! Each stage is a pure intersection filter over the item list, skipped
//! entirely when its setting is a no-op. Stage order therefore does not
//! change the resulting set, only the amount of work done.

use std::cmp::Ordering;
use tracing::debug;

use crate::engine::scoring::{deal_score, CategoryAverages};
use crate::state::FavoriteBrands;
use crate::types::{FilterConfig, Item, SortKey};

/// Apply every active filter stage in `cfg`, preserving input order.
pub fn apply_filters<'a>(
    items: &'a [Item],
    cfg: &FilterConfig,
    favorites: &FavoriteBrands,
) -> Vec<&'a Item> {
    let mut filtered: Vec<&Item> = items.iter().collect();

    if cfg.favorites_only && !favorites.is_empty() {
        filtered.retain(|item| {
            item.brand
                .as_deref()
                .map(|b| favorites.contains(b))
                .unwrap_or(false)
        });
    }

    let query = cfg
        .search_query
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    if let Some(query) = query {
        filtered.retain(|item| {
            item.brand
                .as_deref()
                .map(|b| b.to_lowercase().contains(&query))
                .unwrap_or(false)
                || item.name.to_lowercase().contains(&query)
        });
    }

    if let Some(category) = cfg.category.as_deref().filter(|c| !c.is_empty()) {
        let category = category.to_lowercase();
        filtered.retain(|item| {
            item.category
                .as_deref()
                .map(|c| c.to_lowercase().contains(&category))
                .unwrap_or(false)
        });
    }

    if let Some(source) = &cfg.source {
        filtered.retain(|item| &item.source == source);
    }

    if let Some(brand) = cfg.brand.as_deref() {
        filtered.retain(|item| item.brand.as_deref() == Some(brand));
    }

    if let Some(tier) = cfg.brand_tier {
        filtered.retain(|item| item.tier() == tier);
    }

    if cfg.min_discount > 0.0 {
        filtered.retain(|item| item.discount() >= cfg.min_discount);
    }

    let min_price = cfg.min_price.filter(|p| p.is_finite()).unwrap_or(0.0);
    let max_price = cfg
        .max_price
        .filter(|p| p.is_finite() && *p != 0.0)
        .unwrap_or(f64::INFINITY);
    if min_price > 0.0 || max_price < f64::INFINITY {
        filtered.retain(|item| {
            let price = item.current_price_value();
            price >= min_price && price <= max_price
        });
    }

    filtered
}

/// Sort in place by `key`. The sort is stable; equal keys keep input order.
pub fn sort_items(items: &mut Vec<&Item>, key: SortKey, averages: &CategoryAverages) {
    let desc = |a: f64, b: f64| b.partial_cmp(&a).unwrap_or(Ordering::Equal);
    let asc = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);

    match key {
        SortKey::Score => {
            // Score once per item rather than once per comparison.
            let mut keyed: Vec<(i32, &Item)> = items
                .iter()
                .map(|item| (deal_score(item, averages), *item))
                .collect();
            keyed.sort_by(|a, b| b.0.cmp(&a.0));
            *items = keyed.into_iter().map(|(_, item)| item).collect();
        }
        SortKey::Discount => items.sort_by(|a, b| desc(a.discount(), b.discount())),
        SortKey::Savings => items.sort_by(|a, b| desc(a.savings(), b.savings())),
        SortKey::PriceLow => {
            items.sort_by(|a, b| asc(a.current_price_value(), b.current_price_value()))
        }
        SortKey::PriceHigh => {
            items.sort_by(|a, b| desc(a.current_price_value(), b.current_price_value()))
        }
    }
}

/// Full pipeline: filter, then sort by `cfg.sort_key`.
pub fn filter_and_sort<'a>(
    items: &'a [Item],
    cfg: &FilterConfig,
    favorites: &FavoriteBrands,
    averages: &CategoryAverages,
) -> Vec<&'a Item> {
    let mut filtered = apply_filters(items, cfg, favorites);
    sort_items(&mut filtered, cfg.sort_key, averages);
    debug!(
        total = items.len(),
        matched = filtered.len(),
        sort = ?cfg.sort_key,
        "Filter pipeline complete"
    );
    filtered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
