//! Brand tier classification.
//!
//! A static, ordered table maps curated brand names to prestige tiers.
//! Matching is a loose bidirectional substring test so that partial or
//! decorated brand strings ("Gucci Outlet", "BOSS") still land in the
//! right bucket. Editing the table changes classification, not the
//! algorithm.

use crate::types::BrandTier;

const LUXURY: &[&str] = &[
    "Gucci", "Prada", "Burberry", "Versace", "Balenciaga", "Saint Laurent",
    "Givenchy", "Valentino", "Dolce & Gabbana", "Fendi", "Bottega Veneta",
    "Tom Ford", "Alexander McQueen", "Off-White", "Balmain", "Kenzo",
    "Salvatore Ferragamo", "Ermenegildo Zegna", "Brunello Cucinelli",
];

const PREMIUM: &[&str] = &[
    "Hugo Boss", "BOSS", "Calvin Klein", "Tommy Hilfiger", "Ralph Lauren",
    "Polo Ralph Lauren", "Lacoste", "Ted Baker", "Paul Smith", "Theory",
    "Reiss", "AllSaints", "Sandro", "The Kooples", "Armani Exchange",
    "Michael Kors", "Coach", "Kate Spade", "Marc Jacobs", "Diesel",
    "Fred Perry", "Gant", "Barbour", "Hackett", "Scotch & Soda",
    "J.Lindeberg", "Tiger of Sweden", "Filippa K", "Acne Studios",
    "R.M. Williams", "Country Road", "Trenery", "Witchery", "Saba",
    "MJ Bale", "Oxford", "Calibre", "Aquila", "Julius Marlow",
    "Rodd & Gunn", "Gazman", "Ben Sherman", "Original Penguin",
];

const MIDRANGE: &[&str] = &[
    "Levi's", "Levis", "Nike", "Adidas", "Puma", "New Balance", "Reebok",
    "Under Armour", "The North Face", "Columbia", "Patagonia", "Timberland",
    "Converse", "Vans", "ASICS", "Skechers", "Clarks", "Hush Puppies",
    "Wrangler", "Lee", "Dickies", "Carhartt", "Champion", "Fila",
    "Guess", "Nautica", "Dockers", "Hanes", "Fruit of the Loom",
    "Jack & Jones", "Only & Sons", "Selected Homme", "Blend",
    "Superdry", "Billabong", "Quiksilver", "Rip Curl", "Volcom",
    "ASOS DESIGN", "Topman", "River Island", "Burton", "New Look",
    "Staple Superior", "Academy Brand", "Industrie", "Kenji", "JD Sports",
];

// "Unknown" is listed on purpose: the scrapers' no-brand sentinel is
// treated as a budget brand.
const BUDGET: &[&str] = &[
    "Bonds", "Cotton On", "H&M", "Uniqlo", "Zara", "Pull & Bear",
    "Bershka", "Stradivarius", "Mango", "Primark", "Kmart", "Target",
    "Best & Less", "Big W", "Lowes", "Rivers", "Jeanswest",
    "Jay Jays", "Factorie", "Typo", "Supre", "Valleygirl",
    "Unknown",
];

/// Tiers in lookup priority order. First match wins.
const TIER_TABLE: &[(BrandTier, &[&str])] = &[
    (BrandTier::Luxury, LUXURY),
    (BrandTier::Premium, PREMIUM),
    (BrandTier::Midrange, MIDRANGE),
    (BrandTier::Budget, BUDGET),
];

/// Classify a brand into a prestige tier.
///
/// Absent or empty brands are `Unknown`, as is anything that matches no
/// entry in the table.
pub fn classify_tier(brand: Option<&str>) -> BrandTier {
    let Some(brand) = brand.filter(|b| !b.is_empty()) else {
        return BrandTier::Unknown;
    };
    let needle = brand.to_lowercase();

    TIER_TABLE
        .iter()
        .find(|(_, names)| {
            names.iter().any(|name| {
                let name = name.to_lowercase();
                needle.contains(&name) || name.contains(&needle)
            })
        })
        .map(|(tier, _)| *tier)
        .unwrap_or(BrandTier::Unknown)
}
