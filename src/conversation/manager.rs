use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::extract::extract_reply;
use super::log::{ConversationLog, Turn};
use crate::config::GenerationConfig;
use crate::error::{InferenceError, PromptError, Result};
use crate::inference::{CompletionModel, GenerationParams};
use crate::prompt::PromptTemplate;
use crate::safety::{self, CRISIS_RESPONSE};

/// Owns the process-wide conversation log and drives one turn at a time
/// through safety check, prompt assembly, generation and reply extraction.
///
/// The log lock is only held to read context or commit results, never across
/// the generation await.
pub struct ConversationManager {
    model: Arc<dyn CompletionModel>,
    template: PromptTemplate,
    params: GenerationParams,
    timeout: Duration,
    log: Mutex<ConversationLog>,
}

impl ConversationManager {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        params: GenerationParams,
        timeout: Duration,
    ) -> std::result::Result<Self, PromptError> {
        Ok(Self {
            model,
            template: PromptTemplate::new()?,
            params,
            timeout,
            log: Mutex::new(ConversationLog::new()),
        })
    }

    pub fn from_config(
        model: Arc<dyn CompletionModel>,
        generation: &GenerationConfig,
    ) -> std::result::Result<Self, PromptError> {
        Self::new(
            model,
            generation.params(),
            Duration::from_secs(generation.timeout_secs),
        )
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Copy of the current log, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.lock_log().snapshot()
    }

    /// Answer one user message.
    ///
    /// Crisis input resets the log and returns [`CRISIS_RESPONSE`] without
    /// calling the model. Otherwise the reply is generated and the exchange is
    /// recorded. A failed or timed-out generation records nothing.
    pub async fn handle_turn(&self, user_input: &str) -> Result<String> {
        let input = user_input.trim();

        if let Some(keyword) = safety::matched_keyword(input) {
            self.lock_log().clear();
            warn!(keyword, "crisis phrase detected; conversation reset");
            return Ok(CRISIS_RESPONSE.to_string());
        }

        let user_turn = Turn::user(input);
        let (history, epoch) = {
            let log = self.lock_log();
            (log.context_with(&user_turn), log.epoch())
        };
        let prompt = self.template.render(&history, input)?;

        let raw = self.generate(&prompt).await?;
        let reply = extract_reply(&raw);

        let mut log = self.lock_log();
        if log.epoch() == epoch {
            log.commit_exchange(user_turn, Turn::assistant(reply.clone()));
        } else {
            debug!("conversation was reset during generation; exchange not recorded");
        }

        Ok(reply)
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, InferenceError> {
        let outcome = tokio::time::timeout(self.timeout, self.model.complete(prompt, &self.params))
            .await
            .unwrap_or_else(|_| {
                Err(InferenceError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            });
        if let Err(ref e) = outcome {
            error!(model = self.model.name(), error = %e, "generation failed");
        }
        outcome
    }

    fn lock_log(&self) -> MutexGuard<'_, ConversationLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
