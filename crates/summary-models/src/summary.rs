//! Summary and SummaryVersion entities persisted by the summary store.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a video's summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    NoAudio,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Pending => "pending",
            SummaryStatus::Processing => "processing",
            SummaryStatus::Completed => "completed",
            SummaryStatus::Failed => "failed",
            SummaryStatus::NoAudio => "no_audio",
        }
    }
}

impl std::fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record per video, keyed by `video_path`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub id: i64,
    pub video_path: String,
    pub status: SummaryStatus,
    pub summary: Option<String>,
    /// Raw transcript, possibly carrying an appended `[JUMP_POINTS]` payload.
    pub transcript: Option<String>,
    pub model_used: Option<String>,
    pub audio_duration_seconds: Option<f64>,
    pub processing_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Append-only version history for a video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummaryVersion {
    pub video_path: String,
    pub version: i64,
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub model_used: Option<String>,
    pub processing_time_seconds: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

impl SummaryVersion {
    /// Human-readable label, e.g. "v2 - 07/20/26 - 3.4m".
    pub fn display_label(&self) -> String {
        let date = self.generated_at.format("%m/%d/%y");
        match self.processing_time_seconds {
            Some(secs) if secs > 0.0 => {
                format!("v{} - {date} - {:.1}m", self.version, secs / 60.0)
            }
            _ => format!("v{} - {date}", self.version),
        }
    }
}

/// Compose the `modelUsed` string: `"whisper-<whisperModel>+<llmModel>"`.
pub fn compose_model_used(whisper_model: &str, llm_model: &str) -> String {
    format!("whisper-{whisper_model}+{llm_model}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_used_format() {
        assert_eq!(
            compose_model_used("base", "llama3.2:13b"),
            "whisper-base+llama3.2:13b"
        );
    }

    #[test]
    fn display_label_without_processing_time() {
        let v = SummaryVersion {
            video_path: "/lib/a.mp4".into(),
            version: 1,
            summary: None,
            transcript: None,
            model_used: None,
            processing_time_seconds: None,
            generated_at: Utc::now(),
        };
        assert!(v.display_label().starts_with("v1 - "));
    }
}
