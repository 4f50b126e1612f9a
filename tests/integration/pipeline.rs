//! End-to-end pipeline tests: source → refresher → state → views,
//! plus cache persistence across a simulated restart.

use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use discount_finder::engine::{deal_score, page_slice, total_pages, PAGE_SIZE};
use discount_finder::refresh::Refresher;
use discount_finder::state::{AppState, FavoriteBrands, SharedState};
use discount_finder::storage::CacheStore;
use discount_finder::types::{BrandTier, DealError, FilterConfig, Item, SortKey, Source};

use crate::mock_source::{catalogue, item, MockSource};

fn empty_state() -> SharedState {
    Arc::new(RwLock::new(AppState::new()))
}

fn temp_store() -> CacheStore {
    CacheStore::new(std::env::temp_dir().join(format!("discount_finder_it_{}", uuid::Uuid::new_v4())))
}

#[tokio::test]
async fn test_gucci_ranks_above_zara_end_to_end() {
    let items = vec![
        item(Source::Asos, "Zara", "Zara Tee", None, "$20", "$40", Some(50.0)),
        item(Source::Myer, "Gucci", "Gucci Belt", None, "$500", "$1000", Some(50.0)),
    ];
    let source = Arc::new(MockSource::new().push_ok(items, false));
    let state = empty_state();
    let refresher = Refresher::new(source, state.clone(), None);
    refresher.refresh().await.unwrap();

    let state = state.read().await;
    let page = state.view(&FilterConfig::default(), None);
    assert_eq!(page.items[0].item.brand.as_deref(), Some("Gucci"));
    assert_eq!(page.items[1].item.brand.as_deref(), Some("Zara"));
    assert!(page.items[0].score > page.items[1].score);
}

#[tokio::test]
async fn test_refresh_failure_keeps_cached_items() {
    let source = Arc::new(
        MockSource::new()
            .push_ok(catalogue(), false)
            .push_err(DealError::Status(500)),
    );
    let state = empty_state();
    let refresher = Refresher::new(source.clone(), state.clone(), None);

    let outcome = refresher.refresh().await.unwrap();
    assert_eq!(outcome.status_message(), "Loaded 6 items");

    let err = refresher.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "API error: 500");
    assert_eq!(source.calls(), 2);

    let state = state.read().await;
    assert_eq!(state.items().len(), 6);
    assert_eq!(state.status(), Some("Error: API error: 500"));
}

#[tokio::test]
async fn test_overlapping_refresh_rejected() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = Arc::new(MockSource::gated(started.clone(), release.clone()).push_ok(catalogue(), true));
    let refresher = Arc::new(Refresher::new(source.clone(), empty_state(), None));

    let first = {
        let refresher = refresher.clone();
        tokio::spawn(async move { refresher.refresh().await })
    };
    started.notified().await;

    let second = refresher.refresh().await;
    assert!(matches!(second, Err(DealError::RefreshInProgress)));

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.status_message(), "Loaded 6 items (cached)");
    assert_eq!(source.calls(), 1);
    assert!(!refresher.is_running());
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let store = temp_store();
    let source = Arc::new(MockSource::new().push_ok(catalogue(), false));
    let state = empty_state();
    let refresher = Refresher::new(source, state.clone(), Some(store.clone()));
    refresher.refresh().await.unwrap();

    {
        let mut s = state.write().await;
        s.toggle_favorite("Gucci");
        store.save_favorites(s.favorites()).unwrap();
    }

    // Fresh process: rebuild from disk only.
    let cached = store.load_all();
    let restored = AppState::restore(cached.items, cached.timestamp, cached.favorites);
    assert_eq!(restored.items().len(), 6);
    assert!(restored.favorites().contains("Gucci"));
    assert_eq!(restored.status(), Some("Last updated: 2026-02-21 12:00:00 UTC"));

    let original = state.read().await;
    for (a, b) in original.items().iter().zip(restored.items()) {
        assert_eq!(deal_score(a, original.averages()), deal_score(b, restored.averages()));
    }
    store.clear().unwrap();
}

#[test]
fn test_filters_compose_over_catalogue() {
    let state = AppState::restore(catalogue(), None, FavoriteBrands::from_vec(vec!["Zara".into(), "Uniqlo".into()]));

    let tees = FilterConfig {
        category: Some("t-shirts".into()),
        sort_key: SortKey::PriceLow,
        ..Default::default()
    };
    let names: Vec<String> = state.filtered(&tees).iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["Basic Tee", "Heattech Crew"]);

    let favourites_under_18 = FilterConfig {
        favorites_only: true,
        max_price: Some(18.0),
        ..Default::default()
    };
    let names: Vec<String> = state.filtered(&favourites_under_18).iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["Basic Tee"]);

    let unknown_retailer = FilterConfig {
        source: Some(Source::from("Uniqlo AU")),
        ..Default::default()
    };
    assert_eq!(state.filtered(&unknown_retailer).len(), 1);

    let luxury = FilterConfig { brand_tier: Some(BrandTier::Luxury), ..Default::default() };
    let stats = state.stats(&luxury);
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.top_brand.as_deref(), Some("Gucci"));
    assert_eq!(stats.total_savings, 450.0);
}

#[test]
fn test_pages_cover_large_catalogue_once() {
    let items: Vec<Item> = (0..130)
        .map(|i| item(Source::Asos, "Nike", &format!("Runner {i}"), Some("Shoes"), &format!("${}", 50 + i), "$300", Some(20.0)))
        .collect();
    let state = AppState::restore(items, None, FavoriteBrands::default());
    let cfg = FilterConfig { sort_key: SortKey::PriceHigh, ..Default::default() };

    let filtered = state.filtered(&cfg);
    let pages = total_pages(filtered.len(), PAGE_SIZE);
    assert_eq!(pages, 3);

    let mut seen = Vec::new();
    for page in 1..=pages {
        let view = state.view(&cfg, Some(page));
        assert_eq!(view.items.len(), page_slice(&filtered, page, PAGE_SIZE).len());
        seen.extend(view.items.into_iter().map(|s| s.item.name));
    }
    assert_eq!(seen.len(), 130);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 130);
}

#[test]
fn test_blocking_refresh_from_sync_context() {
    let source = Arc::new(MockSource::new().push_ok(catalogue(), false));
    let state = empty_state();
    let refresher = Refresher::new(source, state.clone(), None);

    let outcome = tokio_test::block_on(refresher.refresh()).unwrap();
    assert_eq!(outcome.item_count, 6);
    assert_eq!(tokio_test::block_on(state.read()).facets().brands.len(), 5);
}
