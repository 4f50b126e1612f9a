//! Deal quality scoring.
//!
//! The score is a weighted sum of four independent components, nominally
//! 40 / 25 / 20 / 15 points:
//!
//! | Component        | Points | Formula                                          |
//! |------------------|--------|--------------------------------------------------|
//! | Discount depth   | 0–40   | `min(40, discount / 70 * 40)`                    |
//! | Brand tier       | 8–25   | fixed bonus per tier                             |
//! | Category value   | 0–20   | `clamp(10 + pct_below_avg / 5, 0, 20)`, else 10  |
//! | Absolute savings | 0–15   | `clamp((original - current) / 300 * 15, 0, 15)`  |
//!
//! The sum is rounded half-up and not clamped.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{BrandTier, DiscountClass, Item, ScoreLabel};

/// Discount percent that earns the full discount component.
const FULL_DISCOUNT_PCT: f64 = 70.0;
const DISCOUNT_POINTS: f64 = 40.0;

const CATEGORY_POINTS: f64 = 20.0;
const CATEGORY_NEUTRAL: f64 = 10.0;
/// Percent below the category average per extra category point.
const CATEGORY_PCT_PER_POINT: f64 = 5.0;

/// Savings (in currency units) that earn the full savings component.
const FULL_SAVINGS: f64 = 300.0;
const SAVINGS_POINTS: f64 = 15.0;

/// Bucket name for items without a category.
pub const UNCATEGORISED: &str = "Other";

/// The item's category, or `"Other"` when it is absent or blank.
pub fn category_bucket(item: &Item) -> &str {
    item.category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORISED)
}

// ---------------------------------------------------------------------------
// Category averages
// ---------------------------------------------------------------------------

/// Mean current price per category, the baseline for relative value.
///
/// Built from the full item list whenever it is replaced, never from a
/// filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryAverages {
    averages: HashMap<String, f64>,
}

impl CategoryAverages {
    /// Average the positive current prices of each category.
    /// Items with no or a blank category are pooled under `"Other"`.
    pub fn from_items(items: &[Item]) -> Self {
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

        for item in items {
            let price = item.current_price_value();
            if price <= 0.0 {
                continue;
            }
            let entry = sums
                .entry(category_bucket(item).to_string())
                .or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }

        let averages = sums
            .into_iter()
            .map(|(category, (sum, count))| (category, sum / count as f64))
            .collect();

        Self { averages }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.averages.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Score components
// ---------------------------------------------------------------------------

/// Per-component breakdown of a deal score, before rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub discount: f64,
    pub tier: f64,
    pub category: f64,
    pub savings: f64,
}

impl ScoreBreakdown {
    pub fn compute(item: &Item, averages: &CategoryAverages) -> Self {
        Self {
            discount: discount_component(item.discount()),
            tier: item.tier().bonus(),
            category: category_component(item, averages),
            savings: savings_component(item.savings()),
        }
    }

    pub fn total(&self) -> f64 {
        self.discount + self.tier + self.category + self.savings
    }

    /// Rounded score. Half-up, matching how the dashboard has always
    /// displayed it.
    pub fn score(&self) -> i32 {
        (self.total() + 0.5).floor() as i32
    }
}

fn discount_component(discount_pct: f64) -> f64 {
    (discount_pct / FULL_DISCOUNT_PCT * DISCOUNT_POINTS).min(DISCOUNT_POINTS)
}

fn category_component(item: &Item, averages: &CategoryAverages) -> f64 {
    let price = item.current_price_value();
    // Without an average the item is compared against itself, which is neutral.
    // The "Other" pool is never looked up.
    let average = item
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .and_then(|c| averages.get(c))
        .filter(|avg| *avg > 0.0)
        .unwrap_or(price);

    if average > 0.0 && price > 0.0 {
        let pct_below_avg = (average - price) / average * 100.0;
        (CATEGORY_NEUTRAL + pct_below_avg / CATEGORY_PCT_PER_POINT).clamp(0.0, CATEGORY_POINTS)
    } else {
        CATEGORY_NEUTRAL
    }
}

fn savings_component(savings: f64) -> f64 {
    (savings / FULL_SAVINGS * SAVINGS_POINTS)
        .min(SAVINGS_POINTS)
        .max(0.0)
}

/// Deal quality score, nominally 0–100.
pub fn deal_score(item: &Item, averages: &CategoryAverages) -> i32 {
    ScoreBreakdown::compute(item, averages).score()
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// An item together with the fields the presentation layer derives from it.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: Item,
    pub score: i32,
    pub label: ScoreLabel,
    pub tier: BrandTier,
    pub tier_name: &'static str,
    pub discount_class: DiscountClass,
    /// Original minus current, floored at 0.
    pub savings: f64,
    /// False when the retailer shows no RRP, so only one price is shown.
    pub has_original_price: bool,
    /// Badge style key for the retailer; empty for unknown retailers.
    pub source_slug: &'static str,
    pub has_link: bool,
    pub is_favorite: bool,
}

impl ScoredItem {
    pub fn new(item: &Item, averages: &CategoryAverages, is_favorite: bool) -> Self {
        let score = deal_score(item, averages);
        let tier = item.tier();
        Self {
            item: item.clone(),
            score,
            label: ScoreLabel::from_score(score),
            tier,
            tier_name: tier.display_name(),
            discount_class: DiscountClass::from_percent(item.discount()),
            savings: item.savings().max(0.0),
            has_original_price: item.has_original_price(),
            source_slug: item.source.slug(),
            has_link: item.has_link(),
            is_favorite,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;

    fn make_item(brand: &str, category: &str, current: &str, original: &str, discount: f64) -> Item {
        Item {
            brand: Some(brand.to_string()),
            category: Some(category.to_string()),
            current_price: current.to_string(),
            original_price: original.to_string(),
            discount_percent: Some(discount),
            ..Item::sample()
        }
    }

    #[test]
    fn test_category_averages_ignore_zero_prices() {
        let items = vec![
            make_item("Nike", "Shoes", "$100", "$200", 50.0),
            make_item("Nike", "Shoes", "$200", "$300", 33.0),
            make_item("Nike", "Shoes", "N/A", "$300", 0.0),
            make_item("Zara", "Jeans", "$40", "$80", 50.0),
        ];
        let averages = CategoryAverages::from_items(&items);
        assert_eq!(averages.len(), 2);
        assert!((averages.get("Shoes").unwrap() - 150.0).abs() < 1e-9);
        assert!((averages.get("Jeans").unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_averages_pool_uncategorised() {
        let mut item = make_item("Nike", "x", "$50", "$60", 10.0);
        item.category = None;
        let averages = CategoryAverages::from_items(&[item]);
        assert_eq!(averages.get(UNCATEGORISED), Some(50.0));
    }

    #[test]
    fn test_reference_score_is_ninety() {
        // 70% off, luxury, priced exactly at category average, $300+ savings.
        let item = make_item("Gucci", "Bags", "$700", "$2,333", 70.0);
        let averages = CategoryAverages::from_items(&[item.clone()]);
        let breakdown = ScoreBreakdown::compute(&item, &averages);
        assert_eq!(breakdown.discount, 40.0);
        assert_eq!(breakdown.tier, 25.0);
        assert_eq!(breakdown.category, 10.0);
        assert_eq!(breakdown.savings, 15.0);
        assert_eq!(deal_score(&item, &averages), 90);
    }

    #[test]
    fn test_discount_component_caps_at_forty() {
        assert_eq!(discount_component(70.0), 40.0);
        assert_eq!(discount_component(95.0), 40.0);
        assert!((discount_component(35.0) - 20.0).abs() < 1e-9);
        assert_eq!(discount_component(0.0), 0.0);
    }

    #[test]
    fn test_category_component_clamps() {
        let cheap = make_item("Nike", "Shoes", "$10", "$20", 50.0);
        let dear = make_item("Nike", "Shoes", "$190", "$200", 5.0);
        let averages = CategoryAverages::from_items(&[cheap.clone(), dear.clone()]);
        // Average 100: cheap is 90% below (10 + 18 → clamped 20),
        // dear is 90% above (10 - 18 → clamped 0).
        assert_eq!(category_component(&cheap, &averages), 20.0);
        assert_eq!(category_component(&dear, &averages), 0.0);
    }

    #[test]
    fn test_category_component_partial() {
        let a = make_item("Nike", "Shoes", "$80", "$100", 20.0);
        let b = make_item("Nike", "Shoes", "$120", "$150", 20.0);
        let averages = CategoryAverages::from_items(&[a.clone(), b]);
        // 20% below average → 10 + 4
        assert!((category_component(&a, &averages) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_component_neutral_without_average() {
        let mut item = make_item("Nike", "Shoes", "$80", "$100", 20.0);
        assert_eq!(category_component(&item, &CategoryAverages::default()), 10.0);
        item.category = None;
        let averages = CategoryAverages::from_items(&[item.clone()]);
        // Uncategorised items are averaged under "Other" but never looked up.
        assert_eq!(category_component(&item, &averages), 10.0);
        item.current_price = "N/A".into();
        assert_eq!(category_component(&item, &averages), 10.0);
    }

    #[test]
    fn test_blank_category_pooled_under_other_and_neutral() {
        let cheap = make_item("Nike", "", "$10", "$20", 50.0);
        let dear = make_item("Nike", "", "$190", "$200", 5.0);
        let averages = CategoryAverages::from_items(&[cheap.clone(), dear.clone()]);
        assert_eq!(averages.get(UNCATEGORISED), Some(100.0));
        assert_eq!(averages.get(""), None);
        assert_eq!(category_bucket(&cheap), UNCATEGORISED);
        assert_eq!(category_component(&cheap, &averages), 10.0);
        assert_eq!(category_component(&dear, &averages), 10.0);
    }

    #[test]
    fn test_savings_component_bounds() {
        assert_eq!(savings_component(300.0), 15.0);
        assert_eq!(savings_component(1000.0), 15.0);
        assert!((savings_component(100.0) - 5.0).abs() < 1e-9);
        assert_eq!(savings_component(-50.0), 0.0);
    }

    #[test]
    fn test_tier_bonus_table() {
        let averages = CategoryAverages::default();
        let base = |brand: &str| {
            let item = Item {
                brand: Some(brand.to_string()),
                discount_percent: None,
                original_price: "N/A".into(),
                category: None,
                ..Item::sample()
            };
            ScoreBreakdown::compute(&item, &averages).tier
        };
        assert_eq!(base("Gucci"), 25.0);
        assert_eq!(base("Lacoste"), 22.0);
        assert_eq!(base("Puma"), 15.0);
        assert_eq!(base("Zyxwv"), 12.0);
        assert_eq!(base("Kmart"), 8.0);
    }

    #[test]
    fn test_score_rounds_half_up() {
        let breakdown = ScoreBreakdown {
            discount: 20.5,
            tier: 12.0,
            category: 10.0,
            savings: 0.0,
        };
        assert_eq!(breakdown.score(), 43);
        let breakdown = ScoreBreakdown { discount: 20.49, ..breakdown };
        assert_eq!(breakdown.score(), 42);
    }

    #[test]
    fn test_score_is_deterministic() {
        let item = make_item("Ted Baker", "Shirts", "$79", "$159", 50.0);
        let averages = CategoryAverages::from_items(&[item.clone()]);
        assert_eq!(deal_score(&item, &averages), deal_score(&item, &averages));
    }

    #[test]
    fn test_max_score_is_not_clamped() {
        // Every component saturated: the sum is exactly 100 and nothing
        // caps it on the way out.
        let cheap = make_item("Gucci", "Bags", "$100", "$1,000", 90.0);
        let dear = make_item("Gucci", "Bags", "$10,000", "$12,000", 10.0);
        let averages = CategoryAverages::from_items(&[cheap.clone(), dear]);
        let breakdown = ScoreBreakdown::compute(&cheap, &averages);
        assert_eq!(breakdown.total(), 100.0);
        assert_eq!(deal_score(&cheap, &averages), 100);
    }

    #[test]
    fn test_scored_item_derived_fields() {
        let item = make_item("Gucci", "Bags", "$500", "$1,000", 50.0);
        let scored = ScoredItem::new(&item, &CategoryAverages::default(), true);
        // 28.57 + 25 + 10 + 15
        assert_eq!(scored.score, 79);
        assert_eq!(scored.label, ScoreLabel::GreatDeal);
        assert_eq!(scored.tier, BrandTier::Luxury);
        assert_eq!(scored.tier_name, "Luxury");
        assert_eq!(scored.discount_class, DiscountClass::High);
        assert_eq!(scored.savings, 500.0);
        assert!(scored.has_original_price);
        assert_eq!(scored.source_slug, "iconic");
        assert!(scored.has_link);
        assert!(scored.is_favorite);
    }

    #[test]
    fn test_scored_item_serializes_flat() {
        let item = make_item("Zara", "Jeans", "$20", "$40", 50.0);
        let scored = ScoredItem::new(&item, &CategoryAverages::default(), false);
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["brand"], "Zara");
        assert_eq!(json["tier"], "budget");
        assert_eq!(json["label"], "Fair");
        assert_eq!(json["score"], 48);
        assert_eq!(json["source_slug"], "iconic");
    }

    #[test]
    fn test_scored_item_without_rrp() {
        let item = Item {
            source: Source::Other("Kmart".into()),
            ..make_item("Anko", "Homewares", "$15", "N/A", 0.0)
        };
        let scored = ScoredItem::new(&item, &CategoryAverages::default(), false);
        assert!(!scored.has_original_price);
        assert_eq!(scored.source_slug, "");
        assert_eq!(scored.savings, 0.0);
    }
}
