//! Crisis-phrase interception.
//!
//! A fixed set of lowercase phrases is matched as case-insensitive substrings
//! of the trimmed user input. A match short-circuits the conversation: the
//! caller clears the log and answers with [`CRISIS_RESPONSE`] without calling
//! the model.

/// Phrases that trigger the safety override. Lowercase; matched as substrings.
pub const CRISIS_KEYWORDS: [&str; 6] = [
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "ending it all",
    "death thoughts",
];

/// Static resource message returned instead of a generated reply.
pub const CRISIS_RESPONSE: &str = "🚨 Immediate Support:
• 988 Suicide & Crisis Lifeline (US)
• Crisis Text Line: TEXT HOME to 741741
• International Help: https://findahelpline.com

You matter. Please reach out now.";

/// Returns true when any crisis phrase occurs in `text`, ignoring case.
pub fn contains_crisis(text: &str) -> bool {
    let normalized = text.to_lowercase();
    CRISIS_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

/// The first crisis phrase found in `text`, for audit logging.
pub fn matched_keyword(text: &str) -> Option<&'static str> {
    let normalized = text.to_lowercase();
    CRISIS_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| normalized.contains(keyword))
}
