//! Jump point: a navigable `{seconds, title}` moment in a video.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The literal separator the Coordinator inserts between a transcript and
/// its serialized jump points.
pub const JUMP_POINTS_MARKER: &str = "\n\n[JUMP_POINTS]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JumpPoint {
    pub seconds: i64,
    pub title: String,
}

/// Append a jump points payload to a transcript, or return it unchanged if
/// `points` is empty.
pub fn append_jump_points(transcript: &str, points: &[JumpPoint]) -> String {
    if points.is_empty() {
        return transcript.to_string();
    }
    let json = serde_json::to_string(points).unwrap_or_else(|_| "[]".to_string());
    format!("{transcript}{JUMP_POINTS_MARKER}{json}")
}

/// Split a persisted transcript into its plain text and jump points, if any.
pub fn split_jump_points(stored: &str) -> (&str, Vec<JumpPoint>) {
    match stored.find(JUMP_POINTS_MARKER) {
        Some(idx) => {
            let (text, rest) = stored.split_at(idx);
            let json = &rest[JUMP_POINTS_MARKER.len()..];
            let points = serde_json::from_str(json).unwrap_or_default();
            (text, points)
        }
        None => (stored, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_append_and_split() {
        let points = vec![
            JumpPoint { seconds: 0, title: "intro".into() },
            JumpPoint { seconds: 42, title: "demo".into() },
        ];
        let stored = append_jump_points("hello world", &points);
        let (text, parsed) = split_jump_points(&stored);
        assert_eq!(text, "hello world");
        assert_eq!(parsed, points);
    }

    #[test]
    fn empty_points_leave_transcript_untouched() {
        let stored = append_jump_points("hello world", &[]);
        assert_eq!(stored, "hello world");
        let (text, parsed) = split_jump_points(&stored);
        assert_eq!(text, "hello world");
        assert!(parsed.is_empty());
    }
}
