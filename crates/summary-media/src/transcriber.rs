//! Transcriber Adapter: converts audio into text plus time-aligned segments
//! by shelling out to a Whisper CLI.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use summary_models::TranscriptSegment;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

const MAX_AUDIO_BYTES: u64 = 200 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct TranscribeResult {
    pub transcript: String,
    pub language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
    /// `1 - mean(segment.no_speech_prob)`, rounded to 3dp, when available.
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    language: Option<String>,
    segments: Vec<TranscriptSegment>,
}

pub async fn transcribe(
    audio_path: impl AsRef<Path>,
    model: &str,
    language: Option<&str>,
) -> MediaResult<TranscribeResult> {
    let audio_path = audio_path.as_ref();

    let meta = tokio::fs::metadata(audio_path)
        .await
        .map_err(|_| MediaError::FileNotFound(audio_path.display().to_string()))?;
    if meta.len() == 0 {
        return Err(MediaError::EmptyInput);
    }
    if meta.len() > MAX_AUDIO_BYTES {
        return Err(MediaError::TooLarge(meta.len()));
    }

    which::which("whisper").map_err(|_| MediaError::WhisperNotFound)?;

    let out_dir = TempDir::new()?;
    let mut args = vec![
        audio_path.display().to_string(),
        "--model".to_string(),
        model.to_string(),
        "--output_format".to_string(),
        "json".to_string(),
        "--output_dir".to_string(),
        out_dir.path().display().to_string(),
    ];
    if let Some(lang) = language {
        args.push("--language".to_string());
        args.push(lang.to_string());
    }

    debug!("running whisper {}", args.join(" "));

    let output = Command::new("whisper")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::classify_stderr(&String::from_utf8_lossy(
            &output.stderr,
        )));
    }

    let stem = audio_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let json_path = out_dir.path().join(format!("{stem}.json"));
    let raw = tokio::fs::read(&json_path).await?;
    let parsed: WhisperOutput = serde_json::from_slice(&raw)?;

    if parsed.text.trim().is_empty() {
        return Err(MediaError::NoSpeech);
    }

    let confidence = confidence_estimate(&parsed.segments);

    Ok(TranscribeResult {
        transcript: parsed.text.trim().to_string(),
        language: parsed.language,
        segments: parsed.segments,
        confidence,
    })
}

/// `1 - mean(no_speech_prob)` rounded to 3dp, when any segment carries it.
fn confidence_estimate(segments: &[TranscriptSegment]) -> Option<f64> {
    let probs: Vec<f64> = segments.iter().filter_map(|s| s.no_speech_prob).collect();
    if probs.is_empty() {
        return None;
    }
    let mean = probs.iter().sum::<f64>() / probs.len() as f64;
    Some(((1.0 - mean) * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_estimate_averages_no_speech_prob() {
        let segments = vec![
            TranscriptSegment {
                start: 0.0,
                end: 5.0,
                text: "hi".into(),
                words: None,
                no_speech_prob: Some(0.1),
            },
            TranscriptSegment {
                start: 5.0,
                end: 10.0,
                text: "there".into(),
                words: None,
                no_speech_prob: Some(0.3),
            },
        ];
        assert_eq!(confidence_estimate(&segments), Some(0.8));
    }

    #[test]
    fn confidence_estimate_none_without_probs() {
        let segments = vec![TranscriptSegment {
            start: 0.0,
            end: 1.0,
            text: "hi".into(),
            words: None,
            no_speech_prob: None,
        }];
        assert_eq!(confidence_estimate(&segments), None);
    }
}
