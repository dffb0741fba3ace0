//! Application state.

use std::sync::Arc;

use summary_coordinator::Engine;
use summary_models::EngineConfig;
use summary_store::SummaryStore;

use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub engine: Arc<Engine>,
}

impl AppState {
    pub async fn new(config: ServiceConfig, engine_config: EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(SummaryStore::from_env().await?);
        let engine = Arc::new(Engine::new(engine_config, store).await);
        Ok(Self { config, engine })
    }
}
