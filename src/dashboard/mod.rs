//! Dashboard: Axum web server exposing the deal engine as JSON.
//!
//! CORS is open so a static front-end served from anywhere can call it.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub use routes::{DashboardHandle, DashboardState};

/// Start the dashboard web server.
///
/// Binds first so a taken port fails here rather than inside the task,
/// then serves in the background.
pub async fn spawn_dashboard(state: DashboardHandle, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: DashboardHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/deals", get(routes::get_deals))
        .route("/api/page", post(routes::post_page))
        .route("/api/stats", get(routes::get_stats))
        .route("/api/charts", get(routes::get_charts))
        .route("/api/facets", get(routes::get_facets))
        .route("/api/favorites", get(routes::get_favorites))
        .route("/api/favorites/toggle", post(routes::toggle_favorite))
        .route("/api/refresh", post(routes::post_refresh))
        .route("/api/status", get(routes::get_status))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
