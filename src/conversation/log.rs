use std::collections::VecDeque;
use std::fmt;

/// Entries kept in the rolling log after each exchange.
pub const MAX_LOG_TURNS: usize = 6;
/// Most recent entries rendered into the prompt history.
pub const CONTEXT_TURNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Speaker {
    #[strum(serialize = "User")]
    User,
    #[strum(serialize = "PsychPal")]
    Assistant,
}

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker(), self.text())
    }
}

/// Bounded, append-only record of recent turns.
///
/// `epoch` advances on every [`clear`](Self::clear); an exchange staged
/// against an older epoch must not be committed.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: VecDeque<Turn>,
    epoch: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Drop every turn and start a new epoch.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.epoch += 1;
    }

    /// Render the prompt history as if `pending` had already been appended:
    /// the last [`CONTEXT_TURNS`] entries, oldest first, one per line.
    pub fn context_with(&self, pending: &Turn) -> String {
        let keep = CONTEXT_TURNS.saturating_sub(1);
        let skip = self.turns.len().saturating_sub(keep);
        self.turns
            .iter()
            .skip(skip)
            .chain(std::iter::once(pending))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Append a completed user/assistant exchange, then keep the newest
    /// [`MAX_LOG_TURNS`] entries.
    pub fn commit_exchange(&mut self, user: Turn, reply: Turn) {
        self.turns.push_back(user);
        self.turns.push_back(reply);
        let excess = self.turns.len().saturating_sub(MAX_LOG_TURNS);
        self.turns.drain(..excess);
    }
}
