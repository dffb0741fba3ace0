//! Jump-Point Heuristic: the Coordinator's own fallback for when the LLM
//! returns no usable structured list.

use regex::Regex;
use summary_models::{JumpPoint, TranscriptSegment};

const WINDOW_SECONDS: f64 = 20.0;
const WINDOW_CHARS: usize = 220;
const KEYWORDS: &[&str] = &[
    "intro",
    "overview",
    "setup",
    "install",
    "configure",
    "demo",
    "example",
    "concept",
    "definition",
    "recap",
    "summary",
    "conclusion",
    "best practice",
    "tip",
    "troubleshoot",
    "issue",
];

struct Window {
    start: f64,
    text: String,
}

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
    windows
}

fn score(window: &Window) -> f64 {
    let lower = window.text.to_lowercase();
    let keyword_hit = KEYWORDS.iter().any(|k| lower.contains(k));
    let mut score = if keyword_hit { 2.0 } else { 0.0 };
    score += (window.text.len() as f64 / 200.0).min(1.0);
    score
}

fn first_sentence(text: &str) -> String {
    let re = Regex::new(r"[.!?]").expect("static regex");
    let sentence = match re.find(text) {
        Some(m) => &text[..m.end()],
        None => text,
    };
    sentence.trim().chars().take(100).collect()
}

/// Score, rank, and downsample transcript windows into at most 8 jump
/// points, ordered by time.
pub fn generate(segments: &[TranscriptSegment]) -> Vec<JumpPoint> {
    let windows = bucket_windows(segments);

    let mut scored: Vec<(f64, &Window)> = windows.iter().map(|w| (score(w), w)).collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(20);
    scored.sort_by(|a, b| a.1.start.partial_cmp(&b.1.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut chosen: Vec<&Window> = scored.into_iter().map(|(_, w)| w).collect();
    if chosen.len() > 8 {
        let step = chosen.len() / 8;
        chosen = chosen.into_iter().step_by(step.max(1)).take(8).collect();
    }

    chosen
        .into_iter()
        .map(|w| JumpPoint {
            seconds: w.start.round() as i64,
            title: first_sentence(&w.text),
        })
        .collect()
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
    fn keyword_windows_outrank_plain_windows() {
        let segments = vec![
            seg(0.0, 20.0, "Let's talk about the weather today, it's nice outside."),
            seg(20.0, 40.0, "Now for the setup and configure steps of the install."),
        ];
        let points = generate(&segments);
        assert_eq!(points.len(), 2);
        assert!(points[1].title.to_lowercase().contains("setup") || points[0].title.to_lowercase().contains("setup"));
    }

    #[test]
    fn caps_output_at_eight_points() {
        let segments: Vec<TranscriptSegment> = (0..40)
            .map(|i| seg(i as f64 * 20.0, (i as f64 + 1.0) * 20.0, "intro overview demo content"))
            .collect();
        let points = generate(&segments);
        assert!(points.len() <= 8);
    }

    #[test]
    fn points_are_sorted_by_start_time() {
        let segments: Vec<TranscriptSegment> = (0..10)
            .map(|i| seg(i as f64 * 20.0, (i as f64 + 1.0) * 20.0, "setup tip demo"))
            .collect();
        let points = generate(&segments);
        let seconds: Vec<i64> = points.iter().map(|p| p.seconds).collect();
        let mut sorted = seconds.clone();
        sorted.sort();
        assert_eq!(seconds, sorted);
    }

    #[test]
    fn empty_segments_yield_no_points() {
        assert!(generate(&[]).is_empty());
    }
}
