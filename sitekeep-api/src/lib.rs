pub mod config;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use sitekeep_common::SITE_ROUTE;
use sitekeep_store::SiteRepository;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SiteRepository>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(repository: SiteRepository, config: &ApiConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            api_key: Arc::from(config.api_key.as_str()),
        }
    }
}

/// Routes plus request tracing, and CORS when origins are configured.
pub fn build_router(config: &ApiConfig, repository: SiteRepository) -> Router {
    let router = Router::new()
        .route(
            SITE_ROUTE,
            get(handlers::get_site).post(handlers::replace_site),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(repository, config));

    match config.cors_layer() {
        Some(cors) => router.layer(cors),
        None => router,
    }
}
