//! In-memory task table behind a single lock.

use std::collections::HashMap;
use summary_models::{Task, TaskId, TaskStatus};

#[derive(Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
}

impl TaskStore {
    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.task_id.clone(), task);
    }

    pub fn get(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.get(task_id).cloned()
    }

    pub fn get_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(task_id)
    }

    pub fn values(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn remove_older_than(&mut self, cutoff: chrono::DateTime<chrono::Utc>) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| {
            !task.status.is_terminal() || task.completed_at.map(|at| at > cutoff).unwrap_or(true)
        });
        before - self.tasks.len()
    }

    pub fn stats(&self) -> QueueStats {
        let mut per_status: HashMap<&'static str, usize> = HashMap::new();
        let mut active = 0;
        for task in self.tasks.values() {
            *per_status.entry(task.status.as_str()).or_insert(0) += 1;
            if task.status.is_active() {
                active += 1;
            }
        }
        QueueStats {
            total: self.tasks.len(),
            pending: per_status.get(TaskStatus::Pending.as_str()).copied().unwrap_or(0),
            active,
            per_status_counts: per_status.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub per_status_counts: HashMap<String, usize>,
}
