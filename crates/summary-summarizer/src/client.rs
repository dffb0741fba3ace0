//! Ollama-backed client implementing the Summarizer Adapter contract.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use summary_models::{JumpPoint, TranscriptSegment};
use tracing::{debug, info, warn};

use crate::error::{SummarizerError, SummarizerResult};
use crate::jump_points::{build_prompt as build_jump_point_prompt, parse_jump_points};
use crate::postprocess::post_process;
use crate::prompt::{build_summary_prompt, truncate_to_budget};

const MAX_TRANSCRIPT_CHARS: usize = 50_000;

pub struct OllamaClient {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    status: String,
}

#[derive(Debug)]
pub struct SummarizeOutput {
    pub summary: String,
    pub model_used: String,
}

#[derive(Debug)]
pub struct HealthStatus {
    pub healthy: bool,
    pub models_available: Vec<String>,
    pub model_ready: bool,
}

#[derive(Debug)]
pub struct PullOutput {
    pub ok: bool,
    pub cached: bool,
}

impl OllamaClient {
    /// `summarize_timeout_sec` bounds the `/api/generate` calls; health and
    /// pull checks use the client's default timeout since they're expected
    /// to be fast.
    pub fn new(endpoint: impl Into<String>, summarize_timeout_sec: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(summarize_timeout_sec))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Check liveness and whether `model` is already pulled.
    pub async fn health(&self, model: &str) -> HealthStatus {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<TagsResponse>().await {
                Ok(tags) => {
                    let names: Vec<String> = tags.models.into_iter().map(|t| t.name).collect();
                    let model_ready = names.iter().any(|n| n == model || n.starts_with(model));
                    HealthStatus {
                        healthy: true,
                        models_available: names,
                        model_ready,
                    }
                }
                Err(e) => {
                    warn!("failed to parse ollama tags response: {e}");
                    HealthStatus {
                        healthy: true,
                        models_available: Vec::new(),
                        model_ready: false,
                    }
                }
            },
            _ => HealthStatus {
                healthy: false,
                models_available: Vec::new(),
                model_ready: false,
            },
        }
    }

    pub async fn pull(&self, model: &str) -> SummarizerResult<PullOutput> {
        let url = format!("{}/api/pull", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                name: model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| SummarizerError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SummarizerError::ServerError(format!(
                "pull returned {}",
                response.status()
            )));
        }

        let parsed: PullResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::ParseFailed(e.to_string()))?;

        Ok(PullOutput {
            ok: true,
            cached: parsed.status == "success",
        })
    }

    pub async fn summarize(
        &self,
        transcript: &str,
        model: &str,
        prompt_budget_chars: usize,
    ) -> SummarizerResult<SummarizeOutput> {
        if transcript.trim().is_empty() {
            return Err(SummarizerError::EmptyTranscript);
        }
        let char_count = transcript.chars().count();
        if char_count > MAX_TRANSCRIPT_CHARS {
            return Err(SummarizerError::TranscriptTooLarge {
                max: MAX_TRANSCRIPT_CHARS,
                actual: char_count,
            });
        }

        let budgeted = truncate_to_budget(transcript, prompt_budget_chars);
        let prompt = build_summary_prompt(&budgeted);

        let raw = self.call_generate(model, &prompt).await?;
        let summary = post_process(&raw);

        Ok(SummarizeOutput {
            summary,
            model_used: model.to_string(),
        })
    }

    pub async fn generate_jump_points(
        &self,
        segments: &[TranscriptSegment],
        model: &str,
        max_points: usize,
    ) -> SummarizerResult<Vec<JumpPoint>> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = build_jump_point_prompt(segments, max_points);
        let raw = self.call_generate(model, &prompt).await?;
        parse_jump_points(&raw, max_points)
            .ok_or_else(|| SummarizerError::ParseFailed("no valid JSON array in response".into()))
    }

    async fn call_generate(&self, model: &str, prompt: &str) -> SummarizerResult<String> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!("calling ollama generate with model {model}");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizerError::Timeout
                } else {
                    SummarizerError::ConnectionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::ServerError(format!("{status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::ParseFailed(e.to_string()))?;

        info!("ollama generate succeeded for model {model}");
        Ok(parsed.response)
    }
}
