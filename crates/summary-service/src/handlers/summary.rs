//! Handlers for the `/summary/*` surface: start, poll, read back.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use summary_coordinator::StartOutcome;
use summary_models::TaskId;

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub video_path: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub task_id: String,
    pub summary_id: i64,
    pub status: String,
}

/// POST /summary/start
pub async fn start_summary(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> ServiceResult<Json<StartResponse>> {
    if req.video_path.trim().is_empty() {
        return Err(ServiceError::bad_request("videoPath is required"));
    }

    info!(video_path = %req.video_path, force = req.force, "start_summary");

    match state
        .engine
        .start(&req.video_path, req.force, req.model_name)
        .await?
    {
        StartOutcome::Enqueued { task_id, summary_id } => Ok(Json(StartResponse {
            task_id: task_id.to_string(),
            summary_id,
            status: "enqueued".to_string(),
        })),
        StartOutcome::Rejected { reason, existing } => Err(ServiceError::Conflict {
            reason: reason.to_string(),
            detail: format!(
                "summary {} for {} (status: {})",
                reason, req.video_path, existing.status
            ),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: String,
    pub progress: String,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<summary_models::Task> for TaskStatusResponse {
    fn from(task: summary_models::Task) -> Self {
        Self {
            task_id: task.task_id.to_string(),
            status: task.status.as_str().to_string(),
            progress: task.progress,
            progress_percent: task.progress_percent,
            result: task.result,
            error: task.error,
        }
    }
}

/// GET /summary/status/:task_id
pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ServiceResult<Json<TaskStatusResponse>> {
    let task = state
        .engine
        .status(&TaskId(task_id.clone()))
        .await
        .ok_or_else(|| ServiceError::not_found(format!("no task with id {task_id}")))?;
    Ok(Json(task.into()))
}

#[derive(Debug, Deserialize)]
pub struct VideoPathQuery {
    pub video_path: String,
}

#[derive(Debug, Serialize)]
pub struct GetSummaryResponse {
    pub found: bool,
    pub video_path: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub jump_points: Vec<summary_models::JumpPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub generated_at: String,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Serialize)]
pub struct VersionSummary {
    pub version: i64,
    pub label: String,
    pub generated_at: String,
}

/// GET /summary/get?videoPath=...
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<VideoPathQuery>,
) -> ServiceResult<Json<GetSummaryResponse>> {
    let latest = match state.engine.get_latest(&query.video_path).await? {
        Some(latest) => latest,
        None => {
            return Ok(Json(GetSummaryResponse {
                found: false,
                video_path: query.video_path,
                status: String::new(),
                summary: None,
                transcript: None,
                jump_points: Vec::new(),
                model_used: None,
                error_message: None,
                generated_at: String::new(),
                versions: Vec::new(),
            }))
        }
    };

    let versions = latest
        .versions
        .iter()
        .map(|v| {
            let descriptor = summary_models::SummaryVersion {
                video_path: latest.summary.video_path.clone(),
                version: v.version,
                summary: None,
                transcript: None,
                model_used: v.model_used.clone(),
                processing_time_seconds: v.processing_time_seconds,
                generated_at: v.generated_at,
            };
            VersionSummary {
                version: v.version,
                label: descriptor.display_label(),
                generated_at: v.generated_at.to_rfc3339(),
            }
        })
        .collect();

    Ok(Json(GetSummaryResponse {
        found: true,
        video_path: latest.summary.video_path,
        status: latest.summary.status.to_string(),
        summary: latest.summary.summary,
        transcript: latest.summary.transcript,
        jump_points: latest.jump_points,
        model_used: latest.summary.model_used,
        error_message: latest.summary.error_message,
        generated_at: latest.summary.generated_at.to_rfc3339(),
        versions,
    }))
}

#[derive(Debug, Serialize)]
pub struct ActiveTaskResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskStatusResponse>,
}

/// GET /summary/active?videoPath=...
pub async fn get_active_task(
    State(state): State<AppState>,
    Query(query): Query<VideoPathQuery>,
) -> Json<ActiveTaskResponse> {
    let task = state.engine.find_active_task(&query.video_path).await;
    Json(ActiveTaskResponse {
        active: task.is_some(),
        task: task.map(Into::into),
    })
}

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub found: bool,
    pub versions: Vec<VersionSummary>,
}

/// GET /summary/versions?videoPath=...
pub async fn list_versions(
    State(state): State<AppState>,
    Query(query): Query<VideoPathQuery>,
) -> ServiceResult<Json<VersionsResponse>> {
    let latest = state.engine.get_latest(&query.video_path).await?;
    let found = latest.is_some();
    let versions = latest
        .map(|l| l.versions)
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            let descriptor = summary_models::SummaryVersion {
                video_path: query.video_path.clone(),
                version: v.version,
                summary: None,
                transcript: None,
                model_used: v.model_used.clone(),
                processing_time_seconds: v.processing_time_seconds,
                generated_at: v.generated_at,
            };
            VersionSummary {
                version: v.version,
                label: descriptor.display_label(),
                generated_at: v.generated_at.to_rfc3339(),
            }
        })
        .collect();
    Ok(Json(VersionsResponse { found, versions }))
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    pub video_path: String,
    pub version: i64,
}

/// GET /summary/version?videoPath=...&version=...
pub async fn get_version(
    State(state): State<AppState>,
    Query(query): Query<VersionQuery>,
) -> ServiceResult<Json<summary_models::SummaryVersion>> {
    let version = state
        .engine
        .get_version(&query.video_path, query.version)
        .await?
        .ok_or_else(|| {
            ServiceError::not_found(format!(
                "no version {} for {}",
                query.version, query.video_path
            ))
        })?;
    Ok(Json(version))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// DELETE /summary/delete/*video_path
pub async fn delete_summary(
    State(state): State<AppState>,
    Path(video_path): Path<String>,
) -> ServiceResult<Json<DeleteResponse>> {
    let deleted = state.engine.delete(&video_path).await?;
    if !deleted {
        return Err(ServiceError::not_found(format!(
            "no summary for {video_path}"
        )));
    }
    Ok(Json(DeleteResponse { ok: true }))
}

/// GET /summary/stats
pub async fn get_stats(State(state): State<AppState>) -> ServiceResult<Json<serde_json::Value>> {
    let store_stats = state.engine.stats().await?;
    let queue_stats = state.engine.queue_stats().await;
    Ok(Json(serde_json::json!({
        "store": store_stats,
        "queue": {
            "total": queue_stats.total,
            "pending": queue_stats.pending,
            "active": queue_stats.active,
            "maxWorkers": queue_stats.max_workers,
            "perStatusCounts": queue_stats.per_status_counts,
        },
    })))
}
