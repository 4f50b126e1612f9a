//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Listing endpoints take the same filter query string:
//!
//! `?category=&source=&brand=&tier=&min_discount=&sort=&q=&min_price=&max_price=&favorites_only=&page=`
//!
//! An empty value or `all` leaves a filter unset.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::engine::facets::Facets;
use crate::engine::stats::{ChartData, DealStats};
use crate::refresh::{RefreshOutcome, Refresher};
use crate::state::{DealPage, FavoriteBrands, SharedState, StatusSnapshot};
use crate::types::{BrandTier, DealError, FilterConfig, SortKey, Source};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub deals: SharedState,
    pub refresher: Arc<Refresher>,
}

impl DashboardState {
    pub fn new(refresher: Arc<Refresher>) -> Self {
        Self {
            deals: refresher.state().clone(),
            refresher,
        }
    }
}

pub type DashboardHandle = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Filter query string shared by the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DealQuery {
    pub category: Option<String>,
    pub source: Option<String>,
    pub brand: Option<String>,
    pub tier: Option<String>,
    pub min_discount: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub favorites_only: Option<String>,
    pub page: Option<String>,
}

/// `None` for blank or `"all"`.
fn selected(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Unparseable numbers are treated as unset, like an empty input box.
fn number(value: Option<String>) -> Option<f64> {
    selected(value)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl DealQuery {
    pub fn filter(&self) -> Result<FilterConfig, DealError> {
        let q = self.clone();
        Ok(FilterConfig {
            category: selected(q.category),
            source: selected(q.source).map(Source::from),
            brand: selected(q.brand),
            brand_tier: selected(q.tier).map(|t| t.parse::<BrandTier>()).transpose()?,
            min_discount: number(q.min_discount).unwrap_or(0.0),
            sort_key: selected(q.sort)
                .map(|s| s.parse::<SortKey>())
                .transpose()?
                .unwrap_or_default(),
            search_query: q.q.filter(|s| !s.trim().is_empty()),
            min_price: number(q.min_price),
            max_price: number(q.max_price),
            favorites_only: selected(q.favorites_only)
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "on" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn page(&self) -> Option<usize> {
        selected(self.page.clone()).and_then(|p| p.parse::<usize>().ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub brand: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleFavoriteResponse {
    pub brand: String,
    pub favorite: bool,
    pub favorites: FavoriteBrands,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub refreshing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for DealError {
    fn into_response(self) -> Response {
        let status = match &self {
            DealError::RefreshInProgress => StatusCode::CONFLICT,
            DealError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            DealError::Http(_)
            | DealError::Status(_)
            | DealError::Decode(_)
            | DealError::Unsuccessful(_) => StatusCode::BAD_GATEWAY,
            DealError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/deals
pub async fn get_deals(
    State(state): State<DashboardHandle>,
    Query(query): Query<DealQuery>,
) -> Result<Json<DealPage>, DealError> {
    let cfg = query.filter()?;
    let mut deals = state.deals.write().await;
    Ok(Json(deals.show(&cfg, query.page())))
}

/// POST /api/page
pub async fn post_page(
    State(state): State<DashboardHandle>,
    Query(query): Query<DealQuery>,
    Json(req): Json<PageRequest>,
) -> Result<Json<DealPage>, DealError> {
    let cfg = query.filter()?;
    let mut deals = state.deals.write().await;
    Ok(Json(deals.navigate(req.delta, &cfg)))
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<DashboardHandle>,
    Query(query): Query<DealQuery>,
) -> Result<Json<DealStats>, DealError> {
    let cfg = query.filter()?;
    Ok(Json(state.deals.read().await.stats(&cfg)))
}

/// GET /api/charts
pub async fn get_charts(
    State(state): State<DashboardHandle>,
    Query(query): Query<DealQuery>,
) -> Result<Json<ChartData>, DealError> {
    let cfg = query.filter()?;
    Ok(Json(state.deals.read().await.charts(&cfg)))
}

/// GET /api/facets
pub async fn get_facets(State(state): State<DashboardHandle>) -> Json<Facets> {
    Json(state.deals.read().await.facets())
}

/// GET /api/favorites
pub async fn get_favorites(State(state): State<DashboardHandle>) -> Json<FavoriteBrands> {
    Json(state.deals.read().await.favorites().clone())
}

/// POST /api/favorites/toggle
pub async fn toggle_favorite(
    State(state): State<DashboardHandle>,
    Json(req): Json<ToggleFavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>, DealError> {
    let brand = req.brand.trim().to_string();
    if brand.is_empty() {
        return Err(DealError::InvalidFilter("brand must not be empty".into()));
    }

    // Saved under the write guard so disk order matches toggle order.
    let mut deals = state.deals.write().await;
    let favorite = deals.toggle_favorite(&brand);
    let favorites = deals.favorites().clone();
    if let Some(store) = state.refresher.store() {
        if let Err(e) = store.save_favorites(&favorites) {
            warn!(error = %e, "Could not persist favourite brands");
        }
    }
    drop(deals);

    Ok(Json(ToggleFavoriteResponse {
        brand,
        favorite,
        favorites,
    }))
}

/// POST /api/refresh
///
/// The refresh runs on its own task and completes even if the client
/// disconnects before it finishes.
pub async fn post_refresh(
    State(state): State<DashboardHandle>,
) -> Result<Json<RefreshOutcome>, DealError> {
    let refresher = state.refresher.clone();
    tokio::spawn(async move { refresher.refresh().await })
        .await
        .map_err(|e| DealError::Internal(format!("Refresh task failed: {e}")))?
        .map(Json)
}

/// GET /api/status
pub async fn get_status(State(state): State<DashboardHandle>) -> Json<StatusResponse> {
    let snapshot = state.deals.read().await.status_snapshot();
    Json(StatusResponse {
        snapshot,
        refreshing: state.refresher.is_running(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
