//! Diagnostic probing via ffprobe. Not on the hot extraction path.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

#[derive(Debug, Clone)]
pub struct ProbeInfo {
    pub duration_seconds: f64,
    pub size_bytes: u64,
    pub has_audio: bool,
    pub has_video: bool,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
}

pub async fn probe(video_path: impl AsRef<Path>) -> MediaResult<ProbeInfo> {
    let video_path = video_path.as_ref();
    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.display().to_string()));
    }
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(video_path)
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

    let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let audio_stream = parsed.streams.iter().find(|s| s.codec_type == "audio");
    let video_stream = parsed.streams.iter().find(|s| s.codec_type == "video");

    Ok(ProbeInfo {
        duration_seconds: parsed
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0),
        size_bytes: parsed
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        has_audio: audio_stream.is_some(),
        has_video: video_stream.is_some(),
        audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
        video_codec: video_stream.and_then(|s| s.codec_name.clone()),
    })
}
