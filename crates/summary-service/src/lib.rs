//! Axum HTTP surface for the video summary orchestration engine.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use routes::create_router;
pub use state::AppState;
