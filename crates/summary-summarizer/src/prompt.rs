//! Prompt construction and transcript truncation for the summarizer.

const HEAD_CHARS: usize = 7_500;
const TAIL_CHARS: usize = 7_500;
const TRUNCATION_MARKER: &str = "\n\n[... transcript truncated ...]\n\n";

/// Truncate `transcript` to fit `budget_chars` by keeping the first and last
/// halves and dropping the middle, when it's over budget.
pub fn truncate_to_budget(transcript: &str, budget_chars: usize) -> String {
    let char_count = transcript.chars().count();
    if char_count <= budget_chars {
        return transcript.to_string();
    }
    let head: String = transcript.chars().take(HEAD_CHARS).collect();
    let tail: String = transcript
        .chars()
        .skip(char_count.saturating_sub(TAIL_CHARS))
        .collect();
    format!("{head}{TRUNCATION_MARKER}{tail}")
}

pub fn build_summary_prompt(transcript: &str) -> String {
    format!(
        r#"You are summarizing a video transcript for someone who has not watched it.

Produce a structured summary with these labeled sections, in this order:
KEY POINTS
DETAILED SUMMARY
KEY CONCEPTS
TOOLS
PREREQUISITES
PRACTICAL APPLICATIONS
STEP-BY-STEP

Use bullet points under each section. Do not repeat the transcript verbatim.
Do not preface your answer with any introduction; begin directly with "KEY POINTS".

TRANSCRIPT:
{transcript}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_transcripts_untouched() {
        let transcript = "a".repeat(100);
        assert_eq!(truncate_to_budget(&transcript, 15_000), transcript);
    }

    #[test]
    fn truncate_keeps_head_and_tail_with_marker() {
        let transcript = "A".repeat(10_000) + &"B".repeat(10_000);
        let truncated = truncate_to_budget(&transcript, 15_000);
        assert!(truncated.starts_with(&"A".repeat(100)));
        assert!(truncated.ends_with(&"B".repeat(100)));
        assert!(truncated.contains("truncated"));
    }
}
