//! Progress callback handed to task handlers.
//!
//! Keeps the callback shape `(message, percent) -> unit` from the source
//! system's worker boundary, but backs it with a lock so API readers never
//! observe a partially-written task.

use std::sync::Arc;
use summary_models::TaskId;
use tokio::sync::RwLock;

use crate::store::TaskStore;

/// Handle passed into a task handler so it can report progress without
/// holding a reference to the whole queue.
#[derive(Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    store: Arc<RwLock<TaskStore>>,
}

impl ProgressReporter {
    pub(crate) fn new(task_id: TaskId, store: Arc<RwLock<TaskStore>>) -> Self {
        Self { task_id, store }
    }

    pub async fn report(&self, message: impl Into<String>, percent: Option<u8>) {
        let mut store = self.store.write().await;
        if let Some(task) = store.get_mut(&self.task_id) {
            task.set_progress(message, percent);
        }
    }
}
