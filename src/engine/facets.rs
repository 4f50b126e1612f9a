//! Distinct values for the filter dropdowns.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::types::Item;

/// Choices offered by the category and brand selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Sorted, distinct, non-empty categories.
    pub categories: Vec<String>,
    /// Sorted, distinct brands, without the `"Unknown"` sentinel.
    pub brands: Vec<String>,
}

impl Facets {
    pub fn from_items(items: &[Item]) -> Self {
        let categories: BTreeSet<&str> = items
            .iter()
            .filter_map(|i| i.category.as_deref())
            .filter(|c| !c.is_empty())
            .collect();
        let brands: BTreeSet<&str> = items.iter().filter_map(|i| i.known_brand()).collect();

        Self {
            categories: categories.into_iter().map(String::from).collect(),
            brands: brands.into_iter().map(String::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facets_sorted_and_distinct() {
        let items = vec![
            Item { brand: Some("Zara".into()), category: Some("Jeans".into()), ..Item::sample() },
            Item { brand: Some("Gant".into()), category: Some("Bags".into()), ..Item::sample() },
            Item { brand: Some("Zara".into()), category: None, ..Item::sample() },
            Item { brand: Some("Unknown".into()), category: Some("".into()), ..Item::sample() },
            Item { brand: None, category: Some("Jeans".into()), ..Item::sample() },
        ];
        let facets = Facets::from_items(&items);
        assert_eq!(facets.categories, vec!["Bags", "Jeans"]);
        assert_eq!(facets.brands, vec!["Gant", "Zara"]);
    }

    #[test]
    fn test_facets_empty() {
        assert_eq!(Facets::from_items(&[]), Facets::default());
    }
}
