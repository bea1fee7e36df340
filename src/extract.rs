//! Speech text extraction from a word explanation.
//!
//! The explanation comes from a generative model, so its layout is a
//! best-effort heuristic: the headword is the first token of the first line,
//! and the example is the line right after a `例句:` marker line. Anything
//! that doesn't fit degrades to just the headword.

use crate::llm::EXAMPLE_MARKER;

/// Full-width variant models sometimes emit for the marker.
const EXAMPLE_MARKER_FULLWIDTH: &str = "例句：";

fn is_marker(line: &str) -> bool {
    let line = line.trim();
    line == EXAMPLE_MARKER || line == EXAMPLE_MARKER_FULLWIDTH
}

/// Headword of `explanation`: first token of the first line, or of the whole
/// text when the first line is blank.
fn headword(explanation: &str) -> Option<&str> {
    explanation
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .or_else(|| explanation.split_whitespace().next())
}

/// The line after the first marker line, with trailing `.`, `!`, `?`
/// replaced by a single period.
fn example(explanation: &str) -> Option<String> {
    let mut lines = explanation.lines();
    lines.by_ref().find(|line| is_marker(line))?;

    let sentence = lines.next()?.trim().trim_end_matches(['.', '!', '?']);
    if sentence.is_empty() {
        return None;
    }
    Some(format!("{sentence}."))
}

/// Build the utterance to synthesize for `explanation`.
///
/// `"quit [kwɪt] v. ...\n例句:\nShe decided to quit!\n..."` becomes
/// `"quit. She decided to quit."`; without an example it is just
/// `"quit."`. Blank input yields an empty string.
pub fn to_speech_text(explanation: &str) -> String {
    let Some(word) = headword(explanation) else {
        return String::new();
    };

    let text = match example(explanation) {
        Some(example) => format!("{word}. {example}"),
        None => format!("{word}."),
    };

    log::debug!("extract: speech text {text:?}");
    text
}
