//! Extractor Adapter: pulls a normalized audio artifact out of a video file.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Successful extraction output.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub audio_path: PathBuf,
    pub duration_seconds: Option<f64>,
}

/// Replace any character outside `[A-Za-z0-9._-]` with `_`.
pub fn safe_filename(name: &str) -> String {
    let re = Regex::new(r"[^A-Za-z0-9._-]").expect("static regex");
    re.replace_all(name, "_").into_owned()
}

/// Parse an ffmpeg `Duration: HH:MM:SS.cc` line from stderr.
fn parse_duration(stderr: &str) -> Option<f64> {
    let re = Regex::new(r"Duration:\s*(\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("static regex");
    let caps = re.captures(stderr)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let centis: f64 = caps[4].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds + centis / 100.0)
}

/// Extract mono 16 kHz PCM16 audio from `video_path` into `out_dir`.
pub async fn extract(
    video_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    timeout_sec: u64,
) -> MediaResult<ExtractResult> {
    let video_path = video_path.as_ref();
    let out_dir = out_dir.as_ref();

    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.display().to_string()));
    }

    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let base = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let audio_path = out_dir.join(format!("{}.wav", safe_filename(base)));

    let args = [
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-i".to_string(),
        video_path.display().to_string(),
        "-vn".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        audio_path.display().to_string(),
    ];

    debug!("running ffmpeg {}", args.join(" "));

    let run = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    let output = match tokio::time::timeout(std::time::Duration::from_secs(timeout_sec), run).await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!("ffmpeg extraction timed out after {timeout_sec}s");
            return Err(MediaError::Timeout(timeout_sec));
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let duration_seconds = parse_duration(&stderr);

    if !output.status.success() {
        return Err(MediaError::classify_stderr(&stderr));
    }

    match tokio::fs::metadata(&audio_path).await {
        Ok(meta) if meta.len() > 0 => Ok(ExtractResult {
            audio_path,
            duration_seconds,
        }),
        _ => Err(MediaError::NoAudioTrack),
    }
}
