use super::engine::TeraEngine;
use crate::error::PromptError;

const TEMPLATE_NAME: &str = "psychpal";

/// Instruction preamble plus the two substitution points: `history` and `input`.
pub const PROMPT_TEMPLATE: &str = r#"[Role]
You are PsychPal - a mental health companion. Respond with:
1. Emotional validation
2. One open question
3. Coping suggestion

[Rules]
- NEVER mention crisis resources unless user explicitly states:
  'suicide', 'kill myself', 'end my life'
- Keep responses conversational
- Maintain 3-5 sentence length

[Examples]
User: "I'm having dark thoughts"
Response: "Dark thoughts can feel overwhelming. Would you like to share what's been troubling you? We could try a grounding exercise."

User: "What's 2+2?"
Response: "Numbers can sometimes represent emotional burdens. What's weighing on your mind?"

[History]
{{ history }}

User: {{ input }}
PsychPal:"#;

/// The fixed companion prompt, compiled once and rendered per turn.
pub struct PromptTemplate {
    engine: TeraEngine,
}

impl PromptTemplate {
    pub fn new() -> Result<Self, PromptError> {
        let mut engine = TeraEngine::new();
        engine.add_template(TEMPLATE_NAME, PROMPT_TEMPLATE)?;
        Ok(Self { engine })
    }

    /// Substitute the rendered history block and the latest user input.
    pub fn render(&self, history: &str, input: &str) -> Result<String, PromptError> {
        let mut ctx = tera::Context::new();
        ctx.insert("history", history);
        ctx.insert("input", input);
        self.engine.render(TEMPLATE_NAME, &ctx)
    }
}
