use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `PsychPal`.
///
/// Errors a conversation turn can end with. The gateway matches on these to
/// pick a status code; binary plumbing uses `anyhow::Result` for ad-hoc
/// context chains.
#[derive(Debug, Error)]
pub enum PalError {
    // ── Inference runtime ───────────────────────────────────────────────
    #[error("inference: {0}")]
    Inference(#[from] InferenceError),

    // ── Prompt / Template ───────────────────────────────────────────────
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Inference runtime errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request to inference runtime failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference runtime returned an error: {0}")]
    Api(String),

    #[error("inference runtime not reachable at {0}")]
    RuntimeUnavailable(String),

    #[error("malformed completion payload: {0}")]
    Malformed(String),

    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("llama-server binary not found: {0}")]
    RuntimeBinaryNotFound(String),

    #[error("failed to start inference runtime: {0}")]
    RuntimeStartFailed(String),

    #[error("timed out waiting for inference runtime to become ready")]
    RuntimeStartTimeout,

    #[error("port {0} is already served by another inference runtime")]
    PortInUse(u16),

    #[error("inference runtime startup aborted by shutdown")]
    StartupAborted,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Whether the failure was the generation deadline rather than a runtime fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ─── Prompt / Template errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template render failed: {0}")]
    Render(String),

    #[error("template not found: {0}")]
    NotFound(String),
}

impl From<tera::Error> for PromptError {
    fn from(err: tera::Error) -> Self {
        match err.kind {
            tera::ErrorKind::TemplateNotFound(ref name) => Self::NotFound(name.clone()),
            _ => Self::Render(err.to_string()),
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PalError>;
