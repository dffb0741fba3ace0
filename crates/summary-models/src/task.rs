//! Task definitions for the in-process queue.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task execution status.
///
/// Valid transitions: Pending -> {Processing, Cancelled}; Processing -> {Completed, Failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Processing)
    }
}

/// Parameters carried by a `video_summary` task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskData {
    pub video_path: String,
    pub summary_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// A background task tracked by the queue.
///
/// `result`/`error` hold the terminal outcome; the JSON result payload is
/// intentionally untyped here since different task types may return
/// different shapes, but the engine only ever produces one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    pub task_id: TaskId,
    pub task_type: String,
    pub data: TaskData,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text progress message.
    pub progress: String,
    /// Progress percent, clamped to [0, 100] and monotonic within one run.
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    pub fn new(task_type: impl Into<String>, data: TaskData) -> Self {
        Self {
            task_id: TaskId::new(),
            task_type: task_type.into(),
            data,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: String::new(),
            progress_percent: 0,
            result: None,
            error: None,
        }
    }

    pub fn set_progress(&mut self, message: impl Into<String>, percent: Option<u8>) {
        self.progress = message.into();
        if let Some(p) = percent {
            self.progress_percent = self.progress_percent.max(p).min(100);
        }
    }

    pub fn start(&mut self) {
        self.status = TaskStatus::Processing;
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self, result: serde_json::Value) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.progress = "Completed".to_string();
        self.progress_percent = 100;
        self.result = Some(result);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = TaskStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.progress = format!("Failed: {message}");
        self.error = Some(message);
    }

    pub fn cancel(&mut self) -> bool {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Cancelled;
            self.completed_at = Some(Utc::now());
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_pending() {
        let data = TaskData {
            video_path: "/lib/a.mp4".into(),
            summary_id: 1,
            user_id: None,
            model_name: None,
        };
        let task = Task::new("video_summary", data);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.progress_percent, 0);
    }

    #[test]
    fn progress_is_monotonic() {
        let data = TaskData {
            video_path: "/lib/a.mp4".into(),
            summary_id: 1,
            user_id: None,
            model_name: None,
        };
        let mut task = Task::new("video_summary", data);
        task.set_progress("starting", Some(10));
        task.set_progress("extracting", Some(5));
        assert_eq!(task.progress_percent, 10);
        task.set_progress("transcribing", Some(40));
        assert_eq!(task.progress_percent, 40);
    }

    #[test]
    fn cancel_only_succeeds_while_pending() {
        let data = TaskData {
            video_path: "/lib/a.mp4".into(),
            summary_id: 1,
            user_id: None,
            model_name: None,
        };
        let mut task = Task::new("video_summary", data);
        task.start();
        assert!(!task.cancel());
        assert_eq!(task.status, TaskStatus::Processing);
    }
}
