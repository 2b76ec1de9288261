use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Stop sequences that end generation before the model starts a new user
/// turn or replays the prompt preamble.
pub const DEFAULT_STOP_SEQUENCES: [&str; 2] = ["\nUser:", "[Role]"];

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub repeat_penalty: f64,
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 250,
            temperature: 0.5,
            top_p: 0.85,
            repeat_penalty: 1.2,
            stop: DEFAULT_STOP_SEQUENCES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A loaded text-completion model.
pub trait CompletionModel: Send + Sync {
    /// Runtime identifier (e.g. "llama.cpp").
    fn name(&self) -> &str;

    /// Generate raw text continuing `prompt`.
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, InferenceError>> + Send + 'a>>;
}
