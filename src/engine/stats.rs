//! Aggregate statistics and chart histograms over the filtered set.

use serde::Serialize;
use std::collections::HashMap;

use crate::engine::scoring::{category_bucket, deal_score, CategoryAverages};
use crate::types::{BrandTier, Item};

/// Number of categories kept in the category breakdown.
pub const TOP_CATEGORIES: usize = 8;

/// Upper bounds (inclusive) of the price buckets; the last bucket is open.
const PRICE_BUCKETS: &[(f64, &str)] = &[
    (25.0, "$0-25"),
    (50.0, "$25-50"),
    (100.0, "$50-100"),
    (200.0, "$100-200"),
    (500.0, "$200-500"),
    (f64::INFINITY, "$500+"),
];

/// Lower bounds (inclusive) of the score buckets, lowest first.
const SCORE_BUCKETS: &[(i32, &str)] = &[
    (i32::MIN, "Meh (0-39)"),
    (40, "Fair (40-59)"),
    (60, "Good (60-74)"),
    (75, "Great (75-89)"),
    (90, "Exceptional (90+)"),
];

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Header and dashboard summary numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealStats {
    pub total_items: usize,
    pub avg_discount: f64,
    pub total_savings: f64,
    pub best_score: Option<i32>,
    pub avg_price: f64,
    pub top_brand: Option<String>,
}

impl DealStats {
    pub fn compute(items: &[&Item], averages: &CategoryAverages) -> Self {
        let n = items.len();
        if n == 0 {
            return Self {
                total_items: 0,
                avg_discount: 0.0,
                total_savings: 0.0,
                best_score: None,
                avg_price: 0.0,
                top_brand: None,
            };
        }

        let avg_discount = items.iter().map(|i| i.discount()).sum::<f64>() / n as f64;
        let total_savings = items.iter().map(|i| i.savings().max(0.0)).sum::<f64>();
        let best_score = items.iter().map(|i| deal_score(i, averages)).max();
        let avg_price = items.iter().map(|i| i.current_price_value()).sum::<f64>() / n as f64;

        let brand_counts = ordered_counts(items.iter().filter_map(|i| i.known_brand()));
        let top_brand = top_n(brand_counts, 1).into_iter().next().map(|(b, _)| b);

        Self {
            total_items: n,
            avg_discount,
            total_savings,
            best_score,
            avg_price,
            top_brand,
        }
    }
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// One labelled histogram bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

impl Bucket {
    fn new(label: impl Into<String>, count: usize) -> Self {
        Self { label: label.into(), count }
    }
}

/// Data for the four dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Most common categories, at most eight, largest first.
    pub categories: Vec<Bucket>,
    /// One bar per tier in fixed order.
    pub tiers: Vec<Bucket>,
    pub prices: Vec<Bucket>,
    pub scores: Vec<Bucket>,
}

impl ChartData {
    pub fn compute(items: &[&Item], averages: &CategoryAverages) -> Self {
        Self {
            categories: category_breakdown(items),
            tiers: tier_breakdown(items),
            prices: price_histogram(items),
            scores: score_histogram(items, averages),
        }
    }
}

pub fn category_breakdown(items: &[&Item]) -> Vec<Bucket> {
    let counts = ordered_counts(items.iter().map(|i| category_bucket(*i)));
    top_n(counts, TOP_CATEGORIES)
        .into_iter()
        .map(|(label, count)| Bucket::new(label, count))
        .collect()
}

pub fn tier_breakdown(items: &[&Item]) -> Vec<Bucket> {
    let mut counts: HashMap<BrandTier, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.tier()).or_default() += 1;
    }
    BrandTier::ALL
        .iter()
        .map(|tier| Bucket::new(tier.display_name(), counts.get(tier).copied().unwrap_or(0)))
        .collect()
}

pub fn price_histogram(items: &[&Item]) -> Vec<Bucket> {
    let mut counts = vec![0usize; PRICE_BUCKETS.len()];
    for item in items {
        let price = item.current_price_value();
        let idx = PRICE_BUCKETS
            .iter()
            .position(|(upper, _)| price <= *upper)
            .unwrap_or(PRICE_BUCKETS.len() - 1);
        counts[idx] += 1;
    }
    PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|((_, label), count)| Bucket::new(*label, count))
        .collect()
}

pub fn score_histogram(items: &[&Item], averages: &CategoryAverages) -> Vec<Bucket> {
    let mut counts = vec![0usize; SCORE_BUCKETS.len()];
    for item in items {
        let score = deal_score(item, averages);
        let idx = SCORE_BUCKETS
            .iter()
            .rposition(|(lower, _)| score >= *lower)
            .unwrap_or(0);
        counts[idx] += 1;
    }
    SCORE_BUCKETS
        .iter()
        .zip(counts)
        .map(|((_, label), count)| Bucket::new(*label, count))
        .collect()
}

/// Count occurrences, remembering first-seen order.
fn ordered_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

/// Largest `n` counts. Stable, so ties keep first-seen order.
fn top_n(mut counts: Vec<(String, usize)>, n: usize) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
