use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower::{ServiceBuilder, limit::GlobalConcurrencyLimitLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use trafficwatch_core::{BatchStore, Error, Extractor};

use crate::{config::ServerConfig, handlers};

/// Shared by every request; only the store's batch counter is mutable
#[derive(Debug)]
pub struct AppState {
    pub extractor: Extractor,
    pub store: BatchStore,
    pub secret: Option<String>,
}

impl AppState {
    /// Builds the extractor and opens the batch store
    ///
    /// # Errors
    ///
    /// Returns an error if the route settings are invalid or the data
    /// directory cannot be created
    pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
        Ok(Self {
            extractor: Extractor::new(&config.route)?,
            store: BatchStore::open(&config.data_dir)?,
            secret: config.secret().map(str::to_owned),
        })
    }
}

pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route(&config.webhook_path, post(handlers::webhook))
        .route("/api/traffic", get(handlers::traffic))
        .route("/api/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .layer(GlobalConcurrencyLimitLayer::new(
                    config.max_concurrent_requests,
                )),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
    }
}
