//! Shared types for the discount finder.
//!
//! These types form the data model used across all modules: the item
//! shape delivered by the scrape API, the closed enums the engine
//! switches on, the filter configuration, and the domain error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::engine::price::parse_price;
use crate::engine::tiers::classify_tier;

/// Sentinel brand the scrapers emit when a product has no brand.
pub const UNKNOWN_BRAND: &str = "Unknown";

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A discounted product as delivered by the scrape API.
///
/// Items are immutable for the lifetime of a fetch cycle; a new fetch
/// replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// `"Unknown"` means the scraper found no brand.
    #[serde(default)]
    pub brand: Option<String>,
    /// Currency-formatted, e.g. `"$1,234.50"`.
    #[serde(default)]
    pub current_price: String,
    /// Currency-formatted, or `"N/A"` when the retailer shows no RRP.
    #[serde(default)]
    pub original_price: String,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
}

impl Item {
    /// Parsed current price (0 when unparseable).
    pub fn current_price_value(&self) -> f64 {
        parse_price(&self.current_price)
    }

    /// Parsed original price (0 when unparseable or `"N/A"`).
    pub fn original_price_value(&self) -> f64 {
        parse_price(&self.original_price)
    }

    /// Original minus current. Negative when the data is inconsistent.
    pub fn savings(&self) -> f64 {
        self.original_price_value() - self.current_price_value()
    }

    /// Discount percentage with a missing value treated as 0.
    pub fn discount(&self) -> f64 {
        self.discount_percent.unwrap_or(0.0)
    }

    pub fn tier(&self) -> BrandTier {
        classify_tier(self.brand.as_deref())
    }

    /// True when the item carries a usable product link.
    pub fn has_link(&self) -> bool {
        self.url
            .as_deref()
            .map(|u| !u.is_empty() && !u.ends_with('#'))
            .unwrap_or(false)
    }

    /// The brand, unless it is absent or the `"Unknown"` sentinel.
    pub fn known_brand(&self) -> Option<&str> {
        self.brand
            .as_deref()
            .filter(|b| !b.is_empty() && *b != UNKNOWN_BRAND)
    }

    /// Whether the original price should be shown next to the current one.
    pub fn has_original_price(&self) -> bool {
        !self.original_price.is_empty() && self.original_price != "N/A"
    }

    /// Helper to build a test/sample item with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Item {
            source: Source::TheIconic,
            name: "Crew Neck Tee".to_string(),
            category: Some("T-Shirts & Singlets".to_string()),
            brand: Some("Nike".to_string()),
            current_price: "$30.00".to_string(),
            original_price: "$60.00".to_string(),
            discount_percent: Some(50.0),
            url: Some("https://www.theiconic.com.au/crew-neck-tee-1.html".to_string()),
            scraped_at: None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} ({} was {}, {:.0}% off)",
            self.source,
            self.brand.as_deref().unwrap_or(UNKNOWN_BRAND),
            self.name,
            self.current_price,
            self.original_price,
            self.discount(),
        )
    }
}

/// Accepts a number, a string starting with a number (`"35%"`), or null
/// for `discount_percent`.
fn lenient_percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) if n.is_finite() => Some(n),
        Some(Raw::Text(s)) => leading_number(&s),
        _ => None,
    })
}

/// Longest leading `[sign]digits[.digits]` run after whitespace.
fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Originating retailer.
///
/// The wire format is the retailer's display name. Identifiers the
/// crate does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    TheIconic,
    Asos,
    Myer,
    JbHiFi,
    DavidJones,
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::TheIconic => "The Iconic",
            Source::Asos => "ASOS",
            Source::Myer => "Myer",
            Source::JbHiFi => "JB Hi-Fi",
            Source::DavidJones => "David Jones",
            Source::Other(name) => name,
        }
    }

    /// Short slug for badge styling; empty for unknown retailers.
    pub fn slug(&self) -> &'static str {
        match self {
            Source::TheIconic => "iconic",
            Source::Asos => "asos",
            Source::Myer => "myer",
            Source::JbHiFi => "jbhifi",
            Source::DavidJones => "davidjones",
            Source::Other(_) => "",
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Other(String::new())
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        match s.as_str() {
            "The Iconic" => Source::TheIconic,
            "ASOS" => Source::Asos,
            "Myer" => Source::Myer,
            "JB Hi-Fi" => Source::JbHiFi,
            "David Jones" => Source::DavidJones,
            _ => Source::Other(s),
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::from(s.to_string())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Coarse brand prestige bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandTier {
    Luxury,
    Premium,
    Midrange,
    Budget,
    Unknown,
}

impl BrandTier {
    /// All tiers in chart order.
    pub const ALL: &'static [BrandTier] = &[
        BrandTier::Luxury,
        BrandTier::Premium,
        BrandTier::Midrange,
        BrandTier::Budget,
        BrandTier::Unknown,
    ];

    /// Fixed deal-score bonus for the tier.
    pub fn bonus(&self) -> f64 {
        match self {
            BrandTier::Luxury => 25.0,
            BrandTier::Premium => 22.0,
            BrandTier::Midrange => 15.0,
            BrandTier::Unknown => 12.0,
            BrandTier::Budget => 8.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BrandTier::Luxury => "Luxury",
            BrandTier::Premium => "Premium",
            BrandTier::Midrange => "Mid-Range",
            BrandTier::Budget => "Budget",
            BrandTier::Unknown => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrandTier::Luxury => "luxury",
            BrandTier::Premium => "premium",
            BrandTier::Midrange => "midrange",
            BrandTier::Budget => "budget",
            BrandTier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BrandTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for BrandTier {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "luxury" => Ok(BrandTier::Luxury),
            "premium" => Ok(BrandTier::Premium),
            "midrange" | "mid-range" => Ok(BrandTier::Midrange),
            "budget" => Ok(BrandTier::Budget),
            "unknown" | "other" => Ok(BrandTier::Unknown),
            _ => Err(DealError::InvalidFilter(format!("unknown brand tier: {s}"))),
        }
    }
}

/// Sort order for the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Deal score, best first.
    #[default]
    Score,
    /// Discount percent, deepest first.
    Discount,
    /// Absolute savings, largest first.
    Savings,
    /// Current price, cheapest first.
    PriceLow,
    /// Current price, most expensive first.
    PriceHigh,
}

impl std::str::FromStr for SortKey {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "score" => Ok(SortKey::Score),
            "discount" => Ok(SortKey::Discount),
            "savings" => Ok(SortKey::Savings),
            "price_low" => Ok(SortKey::PriceLow),
            "price_high" => Ok(SortKey::PriceHigh),
            _ => Err(DealError::InvalidFilter(format!("unknown sort key: {s}"))),
        }
    }
}

/// Human label for a deal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreLabel {
    Exceptional,
    #[serde(rename = "Great Deal")]
    GreatDeal,
    #[serde(rename = "Good Deal")]
    GoodDeal,
    Fair,
    Meh,
}

impl ScoreLabel {
    pub fn from_score(score: i32) -> Self {
        if score >= 90 {
            ScoreLabel::Exceptional
        } else if score >= 75 {
            ScoreLabel::GreatDeal
        } else if score >= 60 {
            ScoreLabel::GoodDeal
        } else if score >= 40 {
            ScoreLabel::Fair
        } else {
            ScoreLabel::Meh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Exceptional => "Exceptional",
            ScoreLabel::GreatDeal => "Great Deal",
            ScoreLabel::GoodDeal => "Good Deal",
            ScoreLabel::Fair => "Fair",
            ScoreLabel::Meh => "Meh",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount badge class. Applied to the discount percent, not the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountClass {
    High,
    Medium,
    Low,
}

impl DiscountClass {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 40.0 {
            DiscountClass::High
        } else if percent >= 20.0 {
            DiscountClass::Medium
        } else {
            DiscountClass::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Filter configuration
// ---------------------------------------------------------------------------

/// User filter and sort selection. `Default` is the "reset filters" state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Matched by case-insensitive containment in the item category.
    pub category: Option<String>,
    pub source: Option<Source>,
    pub brand: Option<String>,
    pub brand_tier: Option<BrandTier>,
    /// Applied only when greater than 0.
    pub min_discount: f64,
    pub sort_key: SortKey,
    pub search_query: Option<String>,
    pub min_price: Option<f64>,
    /// `Some(0.0)` is treated as unset.
    pub max_price: Option<f64>,
    pub favorites_only: bool,
}

// ---------------------------------------------------------------------------
// Scrape API payload
// ---------------------------------------------------------------------------

/// Response body of the scrape API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub items: Option<Vec<Item>>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cached: Option<bool>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub scrape_time_seconds: Option<f64>,
    #[serde(default)]
    pub cache_age_seconds: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScrapeResponse {
    /// Validate the payload and extract the batch.
    ///
    /// `success=false` or a missing item list is a failure; the API's own
    /// error message is carried through when present.
    pub fn into_batch(self) -> Result<DealBatch, DealError> {
        if !self.success {
            return Err(DealError::Unsuccessful(
                self.error.unwrap_or_else(|| "Invalid response".to_string()),
            ));
        }
        let items = self
            .items
            .ok_or_else(|| DealError::Unsuccessful("Invalid response".to_string()))?;
        let timestamp = self
            .timestamp
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        Ok(DealBatch {
            total: self.total.unwrap_or(items.len() as u64),
            items,
            timestamp,
            cached: self.cached.unwrap_or(false),
            scrape_time_seconds: self.scrape_time_seconds,
        })
    }
}

/// A validated, successful fetch.
#[derive(Debug, Clone)]
pub struct DealBatch {
    pub items: Vec<Item>,
    pub timestamp: String,
    pub cached: bool,
    pub total: u64,
    pub scrape_time_seconds: Option<f64>,
}

/// Parse an API timestamp. The API emits naive ISO-8601 local times as
/// well as RFC 3339; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the discount finder.
#[derive(Debug, thiserror::Error)]
pub enum DealError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Unsuccessful(String),

    #[error("A refresh is already in progress")]
    RefreshInProgress,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
