//! HTTP client for llama-server's native completion API.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::InferenceError;
use crate::inference::GenerationParams;

/// Client for communicating with llama-server.
#[derive(Clone)]
pub struct LlamaCppClient {
    client: reqwest::Client,
    base_url: String,
}

/// `/completion` request body.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f64,
    top_p: f64,
    repeat_penalty: f64,
    stop: &'a [String],
    stream: bool,
}

/// `/completion` response body. Only `content` is required.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    tokens_predicted: Option<u64>,
    #[serde(default)]
    stopping_word: Option<String>,
}

impl LlamaCppClient {
    /// Create a new client with a custom URL.
    pub fn with_url(base_url: impl Into<String>) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a new client with a custom port on localhost.
    pub fn with_port(port: u16) -> Result<Self, InferenceError> {
        Self::with_url(format!("http://127.0.0.1:{port}"))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is running and has finished loading its model.
    pub async fn check_health(&self) -> Result<(), InferenceError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            // llama-server answers 503 while the model is still loading.
            Err(InferenceError::RuntimeUnavailable(self.base_url.clone()))
        }
    }

    /// Request a raw completion for `prompt`.
    pub async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let request = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            repeat_penalty: params.repeat_penalty,
            stop: &params.stop,
            stream: false,
        };

        let url = format!("{}/completion", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api(format!("{status}: {text}")));
        }

        let body = response.bytes().await?;
        let completion: CompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        tracing::debug!(
            tokens = completion.tokens_predicted,
            stopping_word = completion.stopping_word.as_deref(),
            "llama-server completion finished"
        );

        Ok(completion.content)
    }

    fn map_send_error(&self, e: reqwest::Error) -> InferenceError {
        if e.is_connect() {
            InferenceError::RuntimeUnavailable(self.base_url.clone())
        } else {
            InferenceError::Request(e)
        }
    }
}
