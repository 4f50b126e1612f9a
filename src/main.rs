//! Discount Finder service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the item cache from disk, starts the dashboard and runs the
//! periodic refresh loop with graceful shutdown.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use discount_finder::config::AppConfig;
use discount_finder::dashboard::{self, DashboardState};
use discount_finder::refresh::Refresher;
use discount_finder::source::ScrapeApiClient;
use discount_finder::state::AppState;
use discount_finder::storage::CacheStore;
use discount_finder::types::DealError;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_or_default(CONFIG_PATH)?;

    init_logging();

    info!(
        api_url = %cfg.api.url,
        data_dir = %cfg.storage.data_dir,
        dashboard_port = cfg.dashboard.port,
        refresh_interval_secs = cfg.refresh.interval_secs,
        "Discount Finder starting up"
    );

    // -- Restore cache ---------------------------------------------------

    let store = cfg
        .storage
        .enabled
        .then(|| CacheStore::new(&cfg.storage.data_dir));

    let state = match &store {
        Some(store) => {
            let cached = store.load_all();
            AppState::restore(cached.items, cached.timestamp, cached.favorites)
        }
        None => {
            info!("Persistence disabled, starting empty");
            AppState::new()
        }
    };
    let state = Arc::new(RwLock::new(state));

    // -- Initialise components -------------------------------------------

    let source = ScrapeApiClient::new(
        cfg.api.url.clone(),
        cfg.api.timeout(),
        cfg.api.user_agent.as_deref(),
    )?;
    let refresher = Arc::new(Refresher::new(Arc::new(source), state, store));

    if cfg.dashboard.enabled {
        let handle = Arc::new(DashboardState::new(refresher.clone()));
        dashboard::spawn_dashboard(handle, cfg.dashboard.port)
            .await
            .with_context(|| format!("Failed to bind dashboard port {}", cfg.dashboard.port))?;
    }

    if cfg.refresh.on_startup {
        run_refresh(&refresher).await;
    }

    // -- Main loop -------------------------------------------------------

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if cfg.refresh.interval_secs == 0 {
        info!("Periodic refresh disabled. Press Ctrl+C to stop.");
        (&mut shutdown).await.context("Failed to listen for shutdown signal")?;
        info!("Shutdown signal received.");
    } else {
        let mut interval = tokio::time::interval(Duration::from_secs(cfg.refresh.interval_secs));
        // The first tick fires immediately; startup refresh is configured separately.
        interval.tick().await;

        info!(
            interval_secs = cfg.refresh.interval_secs,
            "Entering refresh loop. Press Ctrl+C to stop."
        );

        loop {
            tokio::select! {
                _ = interval.tick() => run_refresh(&refresher).await,
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break;
                }
            }
        }
    }

    let items = refresher.state().read().await.items().len();
    info!(items, "Discount Finder shut down cleanly.");
    Ok(())
}

/// One refresh; failures are logged and the loop carries on.
async fn run_refresh(refresher: &Refresher) {
    match refresher.refresh().await {
        Ok(outcome) => info!(
            status = %outcome.status_message(),
            timing = %outcome.cache_info(),
            "Refresh cycle complete"
        ),
        Err(DealError::RefreshInProgress) => {
            warn!("Skipping scheduled refresh, one is already running")
        }
        Err(e) => error!(error = %e, "Refresh cycle failed, will retry next tick"),
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("discount_finder=info"));

    let json_logging = std::env::var("DISCOUNT_FINDER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
