//! Durable Summary Store (C5).

pub mod error;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{AdmissionOutcome, CompletionUpdate, StoreStats, SummaryStore, VersionDescriptor};
