//! TextSum API Gateway
//!
//! HTTP surface of the summary service:
//! - Summary CRUD under `/summaries`
//! - Liveness, readiness and ping probes
//! - Request tracing, request ids, CORS, timeouts and a concurrency cap

pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use textsum_common::{config::AppConfig, errors::AppError, SummaryService, SummaryStore};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<SummaryService>,
    pub store: Arc<dyn SummaryStore>,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());
    let concurrency =
        GlobalConcurrencyLimitLayer::new(state.config.server.max_concurrent_requests.max(1));

    let summary_routes = Router::new()
        .route(
            "/summaries",
            get(handlers::summaries::list_summaries).post(handlers::summaries::create_summary),
        )
        .route(
            "/summaries/",
            get(handlers::summaries::list_summaries).post(handlers::summaries::create_summary),
        )
        .route(
            "/summaries/{id}",
            get(handlers::summaries::get_summary)
                .put(handlers::summaries::update_summary)
                .delete(handlers::summaries::delete_summary),
        )
        .route(
            "/summaries/{id}/",
            get(handlers::summaries::get_summary)
                .put(handlers::summaries::update_summary)
                .delete(handlers::summaries::delete_summary),
        );

    Router::new()
        // Probes
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/ping", get(handlers::health::ping))
        .merge(summary_routes)
        .fallback(not_found)
        .layer(concurrency)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound {
        resource_type: "route".to_string(),
        id: uri.path().to_string(),
    }
}
