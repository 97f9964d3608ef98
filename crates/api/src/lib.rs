//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over the refund orchestrator
//! - Response envelopes and error rendering

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use refund_core::reconciliation::RefundOrchestrator;
use refund_shared::config::CorsConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Refund engine and read-only queries.
    pub orchestrator: Arc<RefundOrchestrator>,
}

impl AppState {
    /// Wraps an orchestrator.
    #[must_use]
    pub fn new(orchestrator: RefundOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cors.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
