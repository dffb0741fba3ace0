//! Candidate window bucketing and response parsing for LLM-generated jump
//! points. The Coordinator's own heuristic (used when this comes back empty
//! or fails to parse) lives alongside the Coordinator, not here.

use regex::Regex;
use summary_models::{JumpPoint, TranscriptSegment};

const WINDOW_SECONDS: f64 = 20.0;
const WINDOW_CHARS: usize = 220;
const MAX_CANDIDATES: usize = 60;

struct Window {
    start: f64,
    text: String,
}

/// Bucket transcript segments into ~20s windows, flushing early once a
/// window accumulates 220+ chars. Caps the result at 60 candidates,
/// downsampling evenly when there would be more.
fn bucket_windows(segments: &[TranscriptSegment]) -> Vec<Window> {
    let mut windows = Vec::new();
    let mut current: Option<Window> = None;

    for seg in segments {
        let window = current.get_or_insert_with(|| Window {
            start: seg.start,
            text: String::new(),
        });
        if !window.text.is_empty() {
            window.text.push(' ');
        }
        window.text.push_str(seg.text.trim());

        let elapsed = seg.end - window.start;
        if elapsed >= WINDOW_SECONDS || window.text.len() >= WINDOW_CHARS {
            windows.push(current.take().unwrap());
        }
    }
    if let Some(w) = current {
        windows.push(w);
    }

    downsample(windows, MAX_CANDIDATES)
}

fn downsample(windows: Vec<Window>, max: usize) -> Vec<Window> {
    if windows.len() <= max {
        return windows;
    }
    let step = windows.len() / max;
    windows.into_iter().step_by(step.max(1)).take(max).collect()
}

/// Render the candidate windows into the transcript block of the jump-point
/// prompt, tagged with their window start time.
fn render_candidates(windows: &[Window]) -> String {
    windows
        .iter()
        .map(|w| format!("[{:.0}s] {}", w.start, w.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(segments: &[TranscriptSegment], max_points: usize) -> String {
    let windows = bucket_windows(segments);
    let candidates = render_candidates(&windows);
    format!(
        r#"Here are timestamped excerpts from a video transcript, bucketed into windows.

{candidates}

Identify the {min}-{max_points} most important navigable moments in this video.
Return ONLY a JSON array, nothing else, with this exact shape:
[{{"seconds": 0, "title": "Short label"}}, ...]

Rules:
- "seconds" must be an integer offset from the start of the video.
- "title" must be 100 characters or fewer.
- Entries must be spread across the whole video, not clustered at the start.
"#,
        min = 6.min(max_points),
    )
}

/// Extract the first balanced top-level JSON array from `text`, ignoring any
/// surrounding prose or markdown fencing.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, serde::Deserialize)]
struct RawJumpPoint {
    #[serde(default)]
    seconds: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
}

/// Parse and coerce a model response into validated jump points, dropping
/// anything that doesn't fit `{seconds: int >= 0, title: str <= 100 chars}`,
/// then downsampling evenly if more than `max_points` survive.
pub fn parse_jump_points(response: &str, max_points: usize) -> Option<Vec<JumpPoint>> {
    let stripped = strip_markdown_fence(response);
    let array_text = extract_json_array(&stripped)?;
    let raw: Vec<RawJumpPoint> = serde_json::from_str(array_text).ok()?;

    let mut points: Vec<JumpPoint> = raw
        .into_iter()
        .filter_map(|r| {
            let seconds = match r.seconds? {
                serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            }?;
            if seconds < 0 {
                return None;
            }
            let title = r.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let title: String = title.chars().take(100).collect();
            Some(JumpPoint { seconds, title })
        })
        .collect();

    if points.len() > max_points {
        let step = (points.len() / max_points).max(1);
        points = points.into_iter().step_by(step).take(max_points).collect();
    }

    Some(points)
}

fn strip_markdown_fence(text: &str) -> String {
    let re = Regex::new(r"^```(?:json)?\s*|\s*```$").expect("static regex");
    re.replace_all(text.trim(), "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
            words: None,
            no_speech_prob: None,
        }
    }

    #[test]
    fn bucket_windows_flushes_on_elapsed_time() {
        let segments = vec![seg(0.0, 10.0, "intro"), seg(10.0, 25.0, "more content here")];
        let windows = bucket_windows(&segments);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn extract_json_array_ignores_surrounding_prose() {
        let text = "Sure, here you go:\n[{\"seconds\": 0, \"title\": \"Intro\"}]\nHope that helps.";
        let array = extract_json_array(text).unwrap();
        assert_eq!(array, "[{\"seconds\": 0, \"title\": \"Intro\"}]");
    }

    #[test]
    fn parse_jump_points_coerces_string_seconds_and_drops_invalid() {
        let response = r#"[{"seconds": "10", "title": "Setup"}, {"seconds": -1, "title": "bad"}, {"title": "no seconds"}]"#;
        let points = parse_jump_points(response, 10).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].seconds, 10);
        assert_eq!(points[0].title, "Setup");
    }

    #[test]
    fn parse_jump_points_downsamples_when_over_cap() {
        let items: Vec<String> = (0..20)
            .map(|i| format!("{{\"seconds\": {i}, \"title\": \"point {i}\"}}"))
            .collect();
        let response = format!("[{}]", items.join(","));
        let points = parse_jump_points(&response, 8).unwrap();
        assert!(points.len() <= 8);
    }

    #[test]
    fn parse_jump_points_none_on_garbage() {
        assert!(parse_jump_points("not json at all", 8).is_none());
    }
}
