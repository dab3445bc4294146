//! Rubric prompt construction for the analysis pipeline.
//!
//! The scoring call embeds the whole transcript with role labels and asks
//! the model for a strict JSON object matching [`AnalysisReport`].
//!
//! [`AnalysisReport`]: colloquy_types::analysis::AnalysisReport

use colloquy_types::session::{MessageRole, TranscriptMessage};

/// System prompt for the rubric scoring call.
pub const RUBRIC_SYSTEM_PROMPT: &str = r#"You are an assessor reviewing a workplace conversation between a participant and a role-played character. Score the PARTICIPANT only.

Return ONLY a JSON object, no prose and no code fences, with exactly this shape:
{
  "conflict-resolution": {"score": <1-5>, "quote": "<verbatim quote from the participant>", "feedback": "<2-3 sentences>"},
  "professionalism": {"score": <1-5>, "quote": "...", "feedback": "..."},
  "articulation": {"score": <1-5>, "quote": "...", "feedback": "..."},
  "learning": {"score": <1-5>, "quote": "...", "feedback": "..."},
  "summary": "<3-4 sentence overall summary>"
}

Scores are integers from 1 (poor) to 5 (excellent). Quotes must come from the participant's own words in the transcript."#;

/// Embed the ordered transcript with role labels, ready to submit as the
/// user turn of the scoring call.
pub fn build_rubric_prompt(transcript: &[TranscriptMessage]) -> String {
    let mut prompt = String::from("Here is the full conversation transcript:\n\n");
    for message in transcript {
        let label = match message.role {
            MessageRole::Participant => "Participant",
            MessageRole::Assistant => "Character",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    prompt.push_str("\nScore the participant against the rubric.");
    prompt
}
