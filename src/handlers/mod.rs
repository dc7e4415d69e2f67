//! HTTP request handlers for Roster

use crate::config::Config;
use crate::error::AppResult;
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::records::RecordStore;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod clicks;
pub mod extract;
pub mod health;
pub mod index;
pub mod metrics;
pub mod records;
pub mod render;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<RecordStore>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// Opens the record store at `storage.path` and creates a fresh metrics
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses to open (strict load of a
    /// corrupt snapshot) or metrics registration fails.
    pub async fn new(config: Arc<Config>) -> AppResult<Self> {
        let store = RecordStore::open(
            config.storage.path.clone(),
            config.storage.load_policy(),
        )
        .await?;
        let metrics = Metrics::new()?;
        Ok(Self::from_parts(config, store, metrics))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(config: Arc<Config>, store: RecordStore, metrics: Metrics) -> Self {
        Self {
            config,
            store: Arc::new(store),
            metrics: Arc::new(metrics),
        }
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the record store
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Get reference to the metrics registry
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the application router with every route and middleware attached
pub fn router(state: AppState) -> Router {
    let static_dir = state
        .config()
        .assets
        .static_dir
        .clone()
        .filter(|dir| !dir.as_os_str().is_empty());

    let mut app = Router::new()
        .route("/", get(index::handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .route("/registrar-clique", post(clicks::handler))
        .route("/salvar", post(records::save))
        .route("/lista", get(records::list))
        .route("/remover", post(records::remove));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
