use crate::error::PromptError;
use tera::Tera;

/// Tera-backed template engine for building completion prompts.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create with inline templates (no filesystem).
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Register a template from a string.
    ///
    /// Names without an `.html`/`.xml` suffix are rendered without escaping,
    /// which is what plain-text prompts need.
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<(), PromptError> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> Result<String, PromptError> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}
