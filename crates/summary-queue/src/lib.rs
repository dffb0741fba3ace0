//! In-process task queue (C4): FIFO dispatch over a bounded worker pool.

pub mod error;
pub mod progress;
pub mod queue;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use progress::ProgressReporter;
pub use queue::{HandlerFuture, QueueStatsView, TaskHandler, TaskQueue};
pub use store::QueueStats;
