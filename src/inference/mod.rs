//! Inference collaborator: a text-completion model reached through a local
//! llama.cpp runtime.

pub mod llama_cpp;
mod traits;

pub use llama_cpp::{LlamaCppClient, LlamaCppModel, LlamaCppServer, load_model, load_model_until};
pub use traits::{CompletionModel, DEFAULT_STOP_SEQUENCES, GenerationParams};
