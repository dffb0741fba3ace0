//! The hot path: Extract -> Transcribe -> Summarize -> persist.
//!
//! Kept as one top-to-bottom function per the source pipeline, with the
//! jump-point heuristic and `modelUsed` composition factored out as pure,
//! independently-testable helpers.

use std::sync::Arc;
use std::time::Instant;

use summary_models::jump_point::append_jump_points;
use summary_models::summary::compose_model_used;
use summary_models::{AdapterError, EngineConfig, TaskData};
use summary_queue::ProgressReporter;
use summary_store::{CompletionUpdate, SummaryStore};
use summary_summarizer::OllamaClient;
use tracing::{info, warn};

use crate::heuristic;

pub struct PipelineDeps {
    pub store: Arc<SummaryStore>,
    pub summarizer: Arc<OllamaClient>,
    pub config: EngineConfig,
}

/// Run the full pipeline for one task. Any error here has already been
/// persisted to the Summary row; the returned `Err` becomes the task's
/// terminal `failed` state at the queue layer.
pub async fn run_pipeline(
    deps: Arc<PipelineDeps>,
    data: TaskData,
    progress: ProgressReporter,
) -> Result<serde_json::Value, String> {
    let started_at = Instant::now();
    progress.report("Starting summarization", Some(0)).await;

    if let Err(e) = deps.store.mark_processing(data.summary_id).await {
        let message = format!("failed to transition summary to processing: {e}");
        warn!("{message}");
        return Err(message);
    }

    // Dropped (and its contents deleted) when this function returns on any
    // path: success, early failure, or panic unwind.
    let temp_dir = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(e) => {
            let message = format!("failed to create scratch directory: {e}");
            mark_failed(&deps, data.summary_id, &message).await;
            return Err(message);
        }
    };

    let model_name = data
        .model_name
        .clone()
        .unwrap_or_else(|| deps.config.llm_model.clone());

    let extracted = match summary_media::extract(
        &data.video_path,
        temp_dir.path(),
        deps.config.extractor_timeout_sec,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            let adapter_err: AdapterError = e.into();
            return fail_task(&deps, data.summary_id, adapter_err).await;
        }
    };
    progress.report("Extracted audio", Some(15)).await;

    progress.report("Transcribing audio", Some(20)).await;
    let transcribed = match summary_media::transcribe(
        &extracted.audio_path,
        &deps.config.whisper_model,
        None,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            let adapter_err: AdapterError = e.into();
            return fail_task(&deps, data.summary_id, adapter_err).await;
        }
    };
    progress.report("Transcribed audio", Some(50)).await;

    progress.report("Summarizing transcript", Some(55)).await;
    let summarized = match deps
        .summarizer
        .summarize(&transcribed.transcript, &model_name, deps.config.prompt_budget_chars)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            let adapter_err: AdapterError = e.into();
            return fail_task(&deps, data.summary_id, adapter_err).await;
        }
    };
    progress.report("Summary generated", Some(85)).await;

    let model_used = compose_model_used(&deps.config.whisper_model, &model_name);

    let llm_points = deps
        .summarizer
        .generate_jump_points(&transcribed.segments, &model_name, 12)
        .await
        .unwrap_or_else(|e| {
            warn!("jump point generation failed, falling back to heuristic: {e}");
            Vec::new()
        });
    let jump_points = if llm_points.is_empty() {
        heuristic::generate(&transcribed.segments)
    } else {
        llm_points
    };
    let persisted_transcript = append_jump_points(&transcribed.transcript, &jump_points);

    let processing_time_seconds = started_at.elapsed().as_secs_f64();

    let version = match deps
        .store
        .persist_completion(
            data.summary_id,
            CompletionUpdate {
                summary: summarized.summary,
                transcript: persisted_transcript,
                model_used: model_used.clone(),
                audio_duration_seconds: extracted.duration_seconds,
                processing_time_seconds,
            },
        )
        .await
    {
        Ok(v) => v,
        Err(e) => return Err(format!("failed to persist completed summary: {e}")),
    };

    progress.report("Completed", Some(100)).await;
    info!(
        video_path = %data.video_path,
        version,
        "summary pipeline completed"
    );

    Ok(serde_json::json!({
        "summaryId": data.summary_id,
        "videoPath": data.video_path,
        "version": version,
        "modelUsed": model_used,
    }))
}

async fn fail_task(
    deps: &Arc<PipelineDeps>,
    summary_id: i64,
    err: AdapterError,
) -> Result<serde_json::Value, String> {
    if err.is_no_audio() {
        if let Err(store_err) = deps.store.mark_no_audio(summary_id, &err.message).await {
            warn!("failed to persist no_audio status: {store_err}");
        }
    } else {
        mark_failed(deps, summary_id, &err.message).await;
    }
    Err(err.message)
}

async fn mark_failed(deps: &Arc<PipelineDeps>, summary_id: i64, message: &str) {
    if let Err(store_err) = deps.store.mark_failed(summary_id, message).await {
        warn!("failed to persist failed status: {store_err}");
    }
}
