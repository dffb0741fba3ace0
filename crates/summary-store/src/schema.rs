//! Row types mirroring the `summaries` / `summary_versions` tables.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use summary_models::{Summary, SummaryStatus, SummaryVersion};

#[derive(Debug, FromRow)]
pub struct SummaryRow {
    pub id: i64,
    pub video_path: String,
    pub status: String,
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub model_used: Option<String>,
    pub audio_duration_seconds: Option<f64>,
    pub processing_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<SummaryRow> for Summary {
    fn from(row: SummaryRow) -> Self {
        Summary {
            id: row.id,
            video_path: row.video_path,
            status: parse_status(&row.status),
            summary: row.summary,
            transcript: row.transcript,
            model_used: row.model_used,
            audio_duration_seconds: row.audio_duration_seconds,
            processing_time_seconds: row.processing_time_seconds,
            error_message: row.error_message,
            generated_at: row.generated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SummaryVersionRow {
    pub video_path: String,
    pub version: i64,
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub model_used: Option<String>,
    pub processing_time_seconds: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

impl From<SummaryVersionRow> for SummaryVersion {
    fn from(row: SummaryVersionRow) -> Self {
        SummaryVersion {
            video_path: row.video_path,
            version: row.version,
            summary: row.summary,
            transcript: row.transcript,
            model_used: row.model_used,
            processing_time_seconds: row.processing_time_seconds,
            generated_at: row.generated_at,
        }
    }
}

fn parse_status(raw: &str) -> SummaryStatus {
    match raw {
        "processing" => SummaryStatus::Processing,
        "completed" => SummaryStatus::Completed,
        "failed" => SummaryStatus::Failed,
        "no_audio" => SummaryStatus::NoAudio,
        _ => SummaryStatus::Pending,
    }
}
