//! Summarizer Adapter (C3): an Ollama-backed LLM client producing summaries
//! and jump points.

pub mod client;
pub mod error;
pub mod jump_points;
pub mod postprocess;
pub mod prompt;

pub use client::{HealthStatus, OllamaClient, PullOutput, SummarizeOutput};
pub use error::{SummarizerError, SummarizerResult};
