//! Shared adapter error taxonomy.
//!
//! Adapters (extractor, transcriber, summarizer) return a structured
//! [`AdapterError`] rather than a single string so the Coordinator can map
//! `NoAudio` to the `no_audio` Summary status and everything else to `failed`.

use thiserror::Error;

/// Error kind, independent of which adapter raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// Missing/invalid input (video path, oversized audio, empty transcript).
    InputError,
    /// Extractor found no audio stream. Terminal, not retried automatically.
    NoAudio,
    /// Network/IO failure, connection error, timeout.
    AdapterTransient,
    /// Corrupted media, unsupported format, model missing.
    AdapterFatal,
    /// Unexpected internal condition (store constraint violation, etc).
    Internal,
}

impl AdapterErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterErrorKind::InputError => "input_error",
            AdapterErrorKind::NoAudio => "no_audio",
            AdapterErrorKind::AdapterTransient => "adapter_transient",
            AdapterErrorKind::AdapterFatal => "adapter_fatal",
            AdapterErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::InputError, message)
    }

    pub fn no_audio(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::NoAudio, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::AdapterTransient, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::AdapterFatal, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Internal, message)
    }

    pub fn is_no_audio(&self) -> bool {
        self.kind == AdapterErrorKind::NoAudio
    }
}
