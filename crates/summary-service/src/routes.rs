//! HTTP routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::health::{ai_health, health, pull_model};
use crate::handlers::summary::{
    delete_summary, get_active_task, get_status, get_stats, get_summary, get_version,
    list_versions, start_summary,
};
use crate::middleware::{cors_layer, request_logging, security_headers};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let summary_routes = Router::new()
        .route("/summary/start", post(start_summary))
        .route("/summary/status/:task_id", get(get_status))
        .route("/summary/get", get(get_summary))
        .route("/summary/active", get(get_active_task))
        .route("/summary/versions", get(list_versions))
        .route("/summary/version", get(get_version))
        .route("/summary/delete/*video_path", delete(delete_summary))
        .route("/summary/stats", get(get_stats));

    let ai_routes = Router::new()
        .route("/ai-health", get(ai_health))
        .route("/ai-model/pull", post(pull_model));

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(summary_routes)
        .merge(ai_routes)
        .merge(health_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
