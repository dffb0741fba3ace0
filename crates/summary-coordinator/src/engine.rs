//! Coordinator (C6): wires the adapters and the store behind the task
//! queue and exposes the entry points the HTTP surface calls into.

use std::path::Path;
use std::sync::Arc;

use summary_models::jump_point::split_jump_points;
use summary_models::{AdapterError, EngineConfig, JumpPoint, Summary, TaskData, TaskId};
use summary_queue::TaskQueue;
use summary_store::{StoreStats, SummaryStore, VersionDescriptor};
use summary_summarizer::OllamaClient;
use tracing::info;

use crate::handler::{run_pipeline, PipelineDeps};

pub const TASK_TYPE: &str = "video_summary";

/// Outcome of a `Start` call.
pub enum StartOutcome {
    Enqueued { task_id: TaskId, summary_id: i64 },
    Rejected { reason: &'static str, existing: Summary },
}

/// A Summary's transcript, split back into plain text and jump points.
pub struct LatestSummary {
    pub summary: Summary,
    pub jump_points: Vec<JumpPoint>,
    pub versions: Vec<VersionDescriptor>,
}

pub struct Engine {
    store: Arc<SummaryStore>,
    queue: Arc<TaskQueue>,
    summarizer: Arc<OllamaClient>,
    config: EngineConfig,
}

impl Engine {
    /// Build the engine and register its pipeline handler with the queue.
    /// Constructed explicitly at startup; nothing here is a lazily-built
    /// singleton.
    pub async fn new(config: EngineConfig, store: Arc<SummaryStore>) -> Self {
        let summarizer = Arc::new(OllamaClient::new(
            config.llm_endpoint.clone(),
            config.summarizer_timeout_sec,
        ));
        let queue = Arc::new(TaskQueue::new(config.max_workers));

        let deps = Arc::new(PipelineDeps {
            store: Arc::clone(&store),
            summarizer: Arc::clone(&summarizer),
            config: config.clone(),
        });

        queue
            .register(TASK_TYPE, move |data, progress| {
                let deps = Arc::clone(&deps);
                Box::pin(run_pipeline(deps, data, progress))
            })
            .await;

        Self {
            store,
            queue,
            summarizer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Admit `video_path` and enqueue a pipeline run, or reject per the
    /// store's admission rules.
    pub async fn start(
        &self,
        video_path: &str,
        force: bool,
        model_name: Option<String>,
    ) -> Result<StartOutcome, AdapterError> {
        if !Path::new(video_path).exists() {
            return Err(AdapterError::input(format!(
                "video not found: {video_path}"
            )));
        }

        match self.store.admit(video_path, force).await? {
            summary_store::AdmissionOutcome::Rejected { reason, existing } => {
                Ok(StartOutcome::Rejected { reason, existing })
            }
            summary_store::AdmissionOutcome::Created { summary_id } => {
                let data = TaskData {
                    video_path: video_path.to_string(),
                    summary_id,
                    user_id: None,
                    model_name,
                };
                let task_id = self
                    .queue
                    .add(TASK_TYPE, data)
                    .await
                    .map_err(|e| AdapterError::internal(e.to_string()))?;
                info!(video_path, summary_id, %task_id, "enqueued summary task");
                Ok(StartOutcome::Enqueued { task_id, summary_id })
            }
        }
    }

    pub async fn status(&self, task_id: &TaskId) -> Option<summary_models::Task> {
        self.queue.get(task_id).await
    }

    /// Find a still-running task for `video_path`, if one exists.
    pub async fn find_active_task(&self, video_path: &str) -> Option<summary_models::Task> {
        let video_path = video_path.to_string();
        self.queue
            .find_active(move |data| data.video_path == video_path)
            .await
    }

    pub async fn get_latest(&self, video_path: &str) -> Result<Option<LatestSummary>, AdapterError> {
        let found = self.store.get_latest(video_path).await?;
        Ok(found.map(|(mut summary, versions)| {
            let jump_points = match summary.transcript.take() {
                Some(stored) => {
                    let (text, points) = split_jump_points(&stored);
                    summary.transcript = Some(text.to_string());
                    points
                }
                None => Vec::new(),
            };
            LatestSummary {
                summary,
                jump_points,
                versions,
            }
        }))
    }

    pub async fn get_version(
        &self,
        video_path: &str,
        version: i64,
    ) -> Result<Option<summary_models::SummaryVersion>, AdapterError> {
        Ok(self.store.get_version(video_path, version).await?)
    }

    pub async fn list_versions(&self, video_path: &str) -> Result<Vec<VersionDescriptor>, AdapterError> {
        Ok(self.store.list_versions(video_path).await?)
    }

    pub async fn delete(&self, video_path: &str) -> Result<bool, AdapterError> {
        Ok(self.store.delete(video_path).await?)
    }

    pub async fn stats(&self) -> Result<StoreStats, AdapterError> {
        Ok(self.store.stats().await?)
    }

    pub async fn queue_stats(&self) -> summary_queue::QueueStatsView {
        self.queue.stats().await
    }

    pub async fn ai_health(&self) -> summary_summarizer::HealthStatus {
        self.summarizer.health(&self.config.llm_model).await
    }

    pub async fn pull_model(&self, model: &str) -> Result<summary_summarizer::PullOutput, AdapterError> {
        self.summarizer.pull(model).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_engine() -> Engine {
        let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
        Engine::new(EngineConfig::default(), store).await
    }

    #[tokio::test]
    async fn start_rejects_a_video_path_that_does_not_exist() {
        let engine = test_engine().await;
        let err = engine
            .start("/no/such/video.mp4", false, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, summary_models::AdapterErrorKind::InputError);
    }

    #[tokio::test]
    async fn start_enqueues_a_task_for_an_existing_file() {
        let engine = test_engine().await;
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        match engine.start(&path, false, None).await.unwrap() {
            StartOutcome::Enqueued { summary_id, .. } => assert!(summary_id > 0),
            StartOutcome::Rejected { .. } => panic!("expected enqueue"),
        }
    }

    #[tokio::test]
    async fn duplicate_start_without_force_is_rejected_before_any_pipeline_work() {
        let engine = test_engine().await;
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        engine.start(&path, false, None).await.unwrap();
        match engine.start(&path, false, None).await.unwrap() {
            StartOutcome::Rejected { reason, .. } => assert_eq!(reason, "already in progress"),
            StartOutcome::Enqueued { .. } => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn get_latest_returns_none_for_an_unknown_path() {
        let engine = test_engine().await;
        assert!(engine.get_latest("/lib/unknown.mp4").await.unwrap().is_none());
    }
}
