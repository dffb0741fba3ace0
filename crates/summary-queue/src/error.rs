//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no handler registered for task type '{0}'")]
    HandlerNotRegistered(String),

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("dispatcher channel closed")]
    DispatcherClosed,
}
