//! Service configuration.

/// HTTP server configuration, distinct from [`summary_models::EngineConfig`]
/// (which tunes the pipeline itself).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("SUMMARY_HOST").unwrap_or(default.host),
            port: std::env::var("SUMMARY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.port),
            cors_origins: std::env::var("SUMMARY_CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.cors_origins),
            environment: std::env::var("SUMMARY_ENVIRONMENT").unwrap_or(default.environment),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
