//! Time-aligned transcript segments, shared between the transcriber and
//! summarizer adapters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptWord {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Option<Vec<TranscriptWord>>,
    #[serde(default)]
    pub no_speech_prob: Option<f64>,
}
