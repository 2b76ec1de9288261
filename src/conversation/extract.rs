//! Turning raw generated text into the user-facing reply.

/// Labels the model may echo from the prompt before its actual answer.
pub const REPLY_MARKERS: [&str; 2] = ["PsychPal:", "Response:"];

/// Replies shorter than this (in characters) are replaced by [`FALLBACK_REPLY`].
pub const MIN_REPLY_CHARS: usize = 4;

pub const FALLBACK_REPLY: &str = "I want to understand better. Could you share more about that?";

/// Everything after the last reply marker in `text`, or all of `text` when no
/// marker is present.
pub fn after_last_marker(text: &str) -> &str {
    REPLY_MARKERS
        .iter()
        .filter_map(|marker| text.rfind(marker).map(|at| at + marker.len()))
        .max()
        .map_or(text, |start| &text[start..])
}

/// Trim, strip echoed labels, trim again, and substitute the fallback for
/// empty or too-short output.
pub fn extract_reply(raw: &str) -> String {
    let reply = after_last_marker(raw.trim()).trim();
    if reply.chars().count() < MIN_REPLY_CHARS {
        FALLBACK_REPLY.to_string()
    } else {
        reply.to_string()
    }
}
