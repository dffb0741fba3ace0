//! Engine-wide configuration, loaded from the environment.

/// Tunables for the summary orchestration engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the Ollama-compatible LLM server.
    pub llm_endpoint: String,
    /// Default model name passed to the summarizer.
    pub llm_model: String,
    /// Whisper model size used by the transcriber (tiny, base, small, medium, large).
    pub whisper_model: String,
    /// Max number of tasks processed concurrently.
    pub max_workers: usize,
    /// Transcripts longer than this are rejected outright.
    pub max_transcript_chars: usize,
    /// Transcripts longer than this are truncated (head+tail) before prompting.
    pub prompt_budget_chars: usize,
    pub extractor_timeout_sec: u64,
    pub summarizer_timeout_sec: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: "http://ollama:11434".to_string(),
            llm_model: "llama3.2:13b".to_string(),
            whisper_model: "base".to_string(),
            max_workers: 2,
            max_transcript_chars: 50_000,
            prompt_budget_chars: 15_000,
            extractor_timeout_sec: 300,
            summarizer_timeout_sec: 2700,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults for
    /// anything missing or unparseable.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_endpoint: std::env::var("SUMMARY_LLM_ENDPOINT").unwrap_or(default.llm_endpoint),
            llm_model: std::env::var("SUMMARY_LLM_MODEL").unwrap_or(default.llm_model),
            whisper_model: std::env::var("SUMMARY_WHISPER_MODEL").unwrap_or(default.whisper_model),
            max_workers: std::env::var("SUMMARY_MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_workers),
            max_transcript_chars: std::env::var("SUMMARY_MAX_TRANSCRIPT_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_transcript_chars),
            prompt_budget_chars: std::env::var("SUMMARY_PROMPT_BUDGET_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.prompt_budget_chars),
            extractor_timeout_sec: std::env::var("SUMMARY_EXTRACTOR_TIMEOUT_SEC")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.extractor_timeout_sec),
            summarizer_timeout_sec: std::env::var("SUMMARY_SUMMARIZER_TIMEOUT_SEC")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.summarizer_timeout_sec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_workers, 2);
        assert_eq!(cfg.max_transcript_chars, 50_000);
        assert_eq!(cfg.prompt_budget_chars, 15_000);
        assert_eq!(cfg.extractor_timeout_sec, 300);
        assert_eq!(cfg.summarizer_timeout_sec, 2700);
    }
}
