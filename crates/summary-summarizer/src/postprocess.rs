//! Summary text post-processing: strip boilerplate, normalize bullets,
//! tidy whitespace.

use regex::Regex;

const BOILERPLATE_PREFIXES: &[&str] = &[
    "here is the summary",
    "here's the summary",
    "here is a summary",
    "summary of the transcript:",
    "summary:",
    "sure, here is the summary",
    "sure! here is the summary",
];

/// Apply the full post-processing pipeline to a raw LLM summary.
pub fn post_process(raw: &str) -> String {
    let mut text = strip_boilerplate(raw);
    text = normalize_bullets(&text);
    if !text.contains('\u{2022}') && text.trim().len() > 100 {
        text = promote_sentences_to_bullets(&text);
    }
    text = split_terminator_bullet_runs(&text);
    text = collapse_whitespace(&text);
    text.trim().to_string()
}

fn strip_boilerplate(text: &str) -> String {
    let mut text = text.trim_start().to_string();
    loop {
        let lower = text.to_lowercase();
        let matched = BOILERPLATE_PREFIXES
            .iter()
            .find(|prefix| lower.starts_with(**prefix));
        match matched {
            Some(prefix) => {
                text = text[prefix.len()..].trim_start().to_string();
            }
            None => break,
        }
    }
    text
}

fn normalize_bullets(text: &str) -> String {
    let re = Regex::new(r"(?m)^\s*(?:[-*]|\d+\.)\s+").expect("static regex");
    re.replace_all(text, "\u{2022} ").into_owned()
}

fn promote_sentences_to_bullets(text: &str) -> String {
    let re = Regex::new(r"[.!?]+\s+").expect("static regex");
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        sentences.push(text[last..m.end()].trim());
        last = m.end();
    }
    if last < text.len() {
        sentences.push(text[last..].trim());
    }
    sentences
        .into_iter()
        .filter(|s| s.len() > 20)
        .map(|s| format!("\u{2022} {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_terminator_bullet_runs(text: &str) -> String {
    let re = Regex::new(r"([.!?])\s*\u{2022}").expect("static regex");
    re.replace_all(text, "$1\n\u{2022}").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    let blank_lines = Regex::new(r"\n{3,}").expect("static regex");
    let spaces = Regex::new(r"[ \t]{2,}").expect("static regex");
    let text = blank_lines.replace_all(text, "\n\n");
    spaces.replace_all(&text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_boilerplate_prefix_case_insensitively() {
        let out = post_process("Here IS the Summary:\n\u{2022} point one");
        assert!(out.starts_with("\u{2022} point one"));
    }

    #[test]
    fn normalizes_dash_star_and_numbered_bullets() {
        let out = post_process("- first\n* second\n1. third");
        assert!(out.contains("\u{2022} first"));
        assert!(out.contains("\u{2022} second"));
        assert!(out.contains("\u{2022} third"));
    }

    #[test]
    fn promotes_sentences_when_no_bullets_and_long_body() {
        let body = "This is the first sentence about the topic. This is the second sentence which goes on longer than twenty characters. Short.";
        let out = post_process(body);
        assert!(out.contains("\u{2022} This is the first sentence"));
    }

    #[test]
    fn collapses_long_blank_line_runs_and_space_runs() {
        let out = post_process("line one\n\n\n\n\nline two   with   gaps");
        assert!(!out.contains("\n\n\n"));
        assert!(!out.contains("   "));
    }

    #[test]
    fn splits_terminator_immediately_followed_by_bullet() {
        let out = post_process("Intro text.\u{2022} next point is a decently long sentence.");
        assert!(out.contains(".\n\u{2022}"));
    }
}
