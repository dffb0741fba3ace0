//! Liveness probe and Summarizer Adapter health/model-pull endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct AiHealthResponse {
    pub healthy: bool,
    pub model_ready: bool,
    pub models_available: Vec<String>,
    /// `healthy && model_ready` — lets the UI distinguish "server down"
    /// from "server up, model not pulled yet" at a glance.
    pub overall: bool,
}

/// GET /ai-health
pub async fn ai_health(State(state): State<AppState>) -> Json<AiHealthResponse> {
    let status = state.engine.ai_health().await;
    Json(AiHealthResponse {
        overall: status.healthy && status.model_ready,
        healthy: status.healthy,
        model_ready: status.model_ready,
        models_available: status.models_available,
    })
}

#[derive(Debug, Deserialize)]
pub struct PullModelRequest {
    pub model: String,
}

#[derive(Serialize)]
pub struct PullModelResponse {
    pub ok: bool,
    pub cached: bool,
}

/// POST /ai-model/pull
pub async fn pull_model(
    State(state): State<AppState>,
    Json(req): Json<PullModelRequest>,
) -> ServiceResult<Json<PullModelResponse>> {
    let result = state.engine.pull_model(&req.model).await?;
    Ok(Json(PullModelResponse {
        ok: result.ok,
        cached: result.cached,
    }))
}
