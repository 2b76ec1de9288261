//! Conversation state and the per-turn pipeline.

mod extract;
mod log;
mod manager;

pub use extract::{FALLBACK_REPLY, MIN_REPLY_CHARS, REPLY_MARKERS, after_last_marker, extract_reply};
pub use log::{CONTEXT_TURNS, ConversationLog, MAX_LOG_TURNS, Speaker, Turn};
pub use manager::ConversationManager;
