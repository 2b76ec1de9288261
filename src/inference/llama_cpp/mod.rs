//! llama.cpp runtime: spawn or attach to `llama-server` and request completions.

mod client;
mod server;

pub use client::LlamaCppClient;
pub use server::LlamaCppServer;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{CompletionModel, GenerationParams};
use crate::config::ModelConfig;
use crate::error::InferenceError;

/// A model served by llama.cpp, optionally owning the runtime process.
pub struct LlamaCppModel {
    client: LlamaCppClient,
    server: Mutex<Option<LlamaCppServer>>,
}

impl LlamaCppModel {
    /// Wrap a client for a runtime managed elsewhere.
    pub fn attached(client: LlamaCppClient) -> Self {
        Self {
            client,
            server: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Terminate the runtime if this handle spawned it.
    pub async fn shutdown(&self) {
        if let Some(mut server) = self.server.lock().await.take() {
            server.stop().await;
        }
    }
}

impl CompletionModel for LlamaCppModel {
    fn name(&self) -> &str {
        "llama.cpp"
    }

    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, InferenceError>> + Send + 'a>> {
        Box::pin(self.client.complete(prompt, params))
    }
}

/// Load a text-completion model as configured.
///
/// With `server_url` set, the running runtime is health-checked and reused.
/// Otherwise llama-server is spawned on the model file and awaited until it
/// reports ready.
pub async fn load_model(config: &ModelConfig) -> Result<LlamaCppModel, InferenceError> {
    load_model_until(config, std::future::pending()).await
}

/// [`load_model`], giving up with [`InferenceError::StartupAborted`] once
/// `abort` resolves. A runtime spawned so far is stopped before returning.
pub async fn load_model_until(
    config: &ModelConfig,
    abort: impl Future<Output = ()>,
) -> Result<LlamaCppModel, InferenceError> {
    if let Some(url) = config.server_url.as_deref() {
        let client = LlamaCppClient::with_url(url)?;
        tokio::select! {
            health = client.check_health() => health?,
            () = abort => return Err(InferenceError::StartupAborted),
        }
        tracing::info!(url = client.base_url(), "Attached to running llama-server");
        return Ok(LlamaCppModel::attached(client));
    }

    let mut server = LlamaCppServer::from_config(config);
    tracing::info!(path = %server.model_path().display(), "Loading model");
    server.ensure_port_free().await?;
    server.start()?;

    let timeout = Duration::from_secs(config.startup_timeout_secs);
    let ready = tokio::select! {
        ready = server.wait_ready(timeout) => ready,
        () = abort => {
            tracing::info!("shutdown requested while the model was loading");
            Err(InferenceError::StartupAborted)
        }
    };
    let client = ready.and_then(|()| server.client());
    match client {
        Ok(client) => Ok(LlamaCppModel {
            client,
            server: Mutex::new(Some(server)),
        }),
        Err(e) => {
            server.stop().await;
            Err(e)
        }
    }
}
