//! In-process FIFO task queue with a bounded worker pool.
//!
//! A single dispatcher task owns a FIFO of pending task ids; up to
//! `max_workers` handlers run concurrently, each to completion or failure.
//! The queue performs no retries; a failed task stays failed until a client
//! re-submits it.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use summary_models::{Task, TaskData, TaskId, TaskStatus};
use tokio::sync::{mpsc, Mutex, RwLock, Semaphore};
use tracing::{debug, error, info, warn};

use crate::error::{QueueError, QueueResult};
use crate::progress::ProgressReporter;
use crate::store::{QueueStats, TaskStore};

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, String>> + Send>>;
pub type TaskHandler = Arc<dyn Fn(TaskData, ProgressReporter) -> HandlerFuture + Send + Sync>;

pub struct TaskQueue {
    store: Arc<RwLock<TaskStore>>,
    handlers: Arc<Mutex<HashMap<String, TaskHandler>>>,
    sender: mpsc::UnboundedSender<TaskId>,
    max_workers: usize,
}

impl TaskQueue {
    /// Build a queue and start its dispatcher loop in the background.
    pub fn new(max_workers: usize) -> Self {
        let store = Arc::new(RwLock::new(TaskStore::default()));
        let handlers: Arc<Mutex<HashMap<String, TaskHandler>>> = Arc::new(Mutex::new(HashMap::new()));
        let (sender, receiver) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(max_workers));

        tokio::spawn(dispatch_loop(
            Arc::clone(&store),
            Arc::clone(&handlers),
            receiver,
            semaphore,
        ));

        Self {
            store,
            handlers,
            sender,
            max_workers,
        }
    }

    /// Bind a handler for a task type. Registering the same type twice
    /// replaces the previous handler.
    pub async fn register<F>(&self, task_type: impl Into<String>, handler: F)
    where
        F: Fn(TaskData, ProgressReporter) -> HandlerFuture + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .await
            .insert(task_type.into(), Arc::new(handler));
    }

    /// Create a pending task and enqueue it for dispatch.
    pub async fn add(&self, task_type: impl Into<String>, data: TaskData) -> QueueResult<TaskId> {
        let task_type = task_type.into();
        if !self.handlers.lock().await.contains_key(&task_type) {
            return Err(QueueError::HandlerNotRegistered(task_type));
        }
        let task = Task::new(task_type, data);
        let task_id = task.task_id.clone();
        self.store.write().await.insert(task);
        self.sender
            .send(task_id.clone())
            .map_err(|_| QueueError::DispatcherClosed)?;
        Ok(task_id)
    }

    pub async fn get(&self, task_id: &TaskId) -> Option<Task> {
        self.store.read().await.get(task_id)
    }

    /// Cancel a task. Only succeeds while the task is still pending.
    pub async fn cancel(&self, task_id: &TaskId) -> bool {
        let mut store = self.store.write().await;
        match store.get_mut(task_id) {
            Some(task) => task.cancel(),
            None => false,
        }
    }

    pub async fn stats(&self) -> QueueStatsView {
        let stats = self.store.read().await.stats();
        QueueStatsView {
            total: stats.total,
            pending: stats.pending,
            active: stats.active,
            per_status_counts: stats.per_status_counts,
            max_workers: self.max_workers,
        }
    }

    /// Drop terminal tasks older than `max_age`.
    pub async fn cleanup(&self, max_age: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        self.store.write().await.remove_older_than(cutoff)
    }

    /// Linear scan for a non-terminal task whose data matches `predicate`.
    pub async fn find_active<P>(&self, predicate: P) -> Option<Task>
    where
        P: Fn(&TaskData) -> bool,
    {
        let store = self.store.read().await;
        store
            .values()
            .find(|task| task.status.is_active() && predicate(&task.data))
            .cloned()
    }
}

#[derive(Debug, Clone)]
pub struct QueueStatsView {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub per_status_counts: HashMap<String, usize>,
    pub max_workers: usize,
}

async fn dispatch_loop(
    store: Arc<RwLock<TaskStore>>,
    handlers: Arc<Mutex<HashMap<String, TaskHandler>>>,
    mut receiver: mpsc::UnboundedReceiver<TaskId>,
    semaphore: Arc<Semaphore>,
) {
    while let Some(task_id) = receiver.recv().await {
        let task = match store.read().await.get(&task_id) {
            Some(t) => t,
            None => continue,
        };
        if task.status != TaskStatus::Pending {
            debug!("skipping dispatch of task {task_id}, no longer pending");
            continue;
        }

        let handler = match handlers.lock().await.get(&task.task_type).cloned() {
            Some(h) => h,
            None => {
                warn!("no handler for task type '{}', dropping task {task_id}", task.task_type);
                continue;
            }
        };

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };

        let store = Arc::clone(&store);
        let data = task.data.clone();

        tokio::spawn(async move {
            let _permit = permit;
            {
                let mut store = store.write().await;
                if let Some(task) = store.get_mut(&task_id) {
                    task.start();
                }
            }

            let reporter = ProgressReporter::new(task_id.clone(), Arc::clone(&store));
            let result = handler(data, reporter).await;

            let mut store = store.write().await;
            if let Some(task) = store.get_mut(&task_id) {
                match result {
                    Ok(value) => {
                        info!("task {task_id} completed");
                        task.complete(value);
                    }
                    Err(message) => {
                        error!("task {task_id} failed: {message}");
                        task.fail(message);
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_data() -> TaskData {
        TaskData {
            video_path: "/lib/a.mp4".into(),
            summary_id: 1,
            user_id: None,
            model_name: None,
        }
    }

    #[tokio::test]
    async fn add_without_registered_handler_is_rejected() {
        let queue = TaskQueue::new(2);
        let err = queue.add("video_summary", sample_data()).await.unwrap_err();
        assert!(matches!(err, QueueError::HandlerNotRegistered(_)));
    }

    #[tokio::test]
    async fn registered_handler_runs_to_completion() {
        let queue = TaskQueue::new(2);
        queue
            .register("video_summary", |_data, _progress| {
                Box::pin(async { Ok(serde_json::json!({"ok": true})) })
            })
            .await;

        let task_id = queue.add("video_summary", sample_data()).await.unwrap();

        let mut completed = false;
        for _ in 0..50 {
            if let Some(task) = queue.get(&task_id).await {
                if task.status.is_terminal() {
                    completed = true;
                    assert_eq!(task.status, TaskStatus::Completed);
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(completed, "task never reached a terminal state");
    }

    #[tokio::test]
    async fn cancel_only_succeeds_while_pending() {
        let queue = TaskQueue::new(1);
        queue
            .register("video_summary", |_data, _progress| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(serde_json::json!({}))
                })
            })
            .await;

        let task_id = queue.add("video_summary", sample_data()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!queue.cancel(&task_id).await);
    }

    #[tokio::test]
    async fn stats_reflect_pending_and_total_counts() {
        let queue = TaskQueue::new(0);
        queue
            .register("video_summary", |_data, _progress| {
                Box::pin(async { Ok(serde_json::json!({})) })
            })
            .await;
        queue.add("video_summary", sample_data()).await.unwrap();
        let stats = queue.stats().await;
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.max_workers, 0);
    }
}
