//! Error types for the extractor and transcriber adapters.

use summary_models::{AdapterError, AdapterErrorKind};
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("whisper not found in PATH")]
    WhisperNotFound,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("video has no audio track")]
    NoAudioTrack,

    #[error("input file is corrupted")]
    Corrupted,

    #[error("permission denied reading input")]
    PermissionDenied,

    #[error("unsupported input format")]
    UnsupportedFormat,

    #[error("operation timed out after {0}s")]
    Timeout(u64),

    #[error("audio file too large ({0} bytes)")]
    TooLarge(u64),

    #[error("audio file is empty")]
    EmptyInput,

    #[error("transcriber produced no speech")]
    NoSpeech,

    #[error("unknown failure: {0}")]
    Unknown(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Classify a tool's stderr tail into one of the known failure kinds.
    ///
    /// Mirrors the substring-matching classifier the extraction service used
    /// before this engine, kept because stderr text is the only signal
    /// available from the subprocess.
    pub fn classify_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("no such file") || lower.contains("does not exist") {
            MediaError::FileNotFound(stderr.to_string())
        } else if lower.contains("does not contain any stream") || lower.contains("no audio") {
            MediaError::NoAudioTrack
        } else if lower.contains("invalid data found") || lower.contains("corrupt") {
            MediaError::Corrupted
        } else if lower.contains("permission denied") {
            MediaError::PermissionDenied
        } else if lower.contains("unknown format") || lower.contains("unsupported") {
            MediaError::UnsupportedFormat
        } else {
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            MediaError::Unknown(last_line.unwrap_or("no diagnostic output").to_string())
        }
    }
}

impl From<MediaError> for AdapterError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::FileNotFound(_) => AdapterError::input(err.to_string()),
            MediaError::NoAudioTrack => AdapterError::no_audio(err.to_string()),
            MediaError::NoSpeech => AdapterError::no_audio(err.to_string()),
            MediaError::TooLarge(_) | MediaError::EmptyInput => {
                AdapterError::input(err.to_string())
            }
            MediaError::Corrupted
            | MediaError::UnsupportedFormat
            | MediaError::FfmpegNotFound
            | MediaError::FfprobeNotFound
            | MediaError::WhisperNotFound => AdapterError::fatal(err.to_string()),
            MediaError::Timeout(_) | MediaError::Io(_) => AdapterError::transient(err.to_string()),
            MediaError::PermissionDenied
            | MediaError::Unknown(_)
            | MediaError::JsonParse(_) => AdapterError::fatal(err.to_string()),
        }
    }
}
