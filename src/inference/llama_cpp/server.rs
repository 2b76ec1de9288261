//! Process manager for a spawned llama-server.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::client::LlamaCppClient;
use crate::config::ModelConfig;
use crate::error::InferenceError;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Manager for the llama-server process.
pub struct LlamaCppServer {
    binary: String,
    model_path: PathBuf,
    port: u16,
    ctx_size: u32,
    process: Option<Child>,
}

impl LlamaCppServer {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            binary: config.server_binary.clone(),
            model_path: config.resolved_path(),
            port: config.port,
            ctx_size: config.ctx_size,
            process: None,
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Command-line arguments passed to llama-server.
    fn args(&self) -> Vec<String> {
        vec![
            "--model".into(),
            self.model_path.display().to_string(),
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            self.port.to_string(),
            "--ctx-size".into(),
            self.ctx_size.to_string(),
        ]
    }

    /// Fail if something already answers `/health` on our port. A leftover
    /// runtime there would otherwise pass the readiness check for us.
    pub async fn ensure_port_free(&self) -> Result<(), InferenceError> {
        if self.client()?.check_health().await.is_ok() {
            return Err(InferenceError::PortInUse(self.port));
        }
        Ok(())
    }

    /// Start the llama-server process.
    pub fn start(&mut self) -> Result<(), InferenceError> {
        if !self.model_path.is_file() {
            return Err(InferenceError::ModelNotFound(
                self.model_path.display().to_string(),
            ));
        }

        info!(
            port = self.port,
            model = %self.model_path.display(),
            "Starting llama-server"
        );

        let child = Command::new(&self.binary)
            .args(self.args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InferenceError::RuntimeBinaryNotFound(self.binary.clone())
                } else {
                    InferenceError::Io(e)
                }
            })?;

        debug!(pid = child.id(), "llama-server process started");
        self.process = Some(child);

        Ok(())
    }

    /// Wait for the server to finish loading the model.
    ///
    /// A healthy answer only counts while our child is still alive.
    pub async fn wait_ready(&mut self, timeout: Duration) -> Result<(), InferenceError> {
        let client = self.client()?;
        let start = Instant::now();

        info!("Waiting for llama-server to become ready...");

        while start.elapsed() < timeout {
            if !self.is_running() {
                return Err(InferenceError::RuntimeStartFailed(
                    "llama-server exited during startup".into(),
                ));
            }
            if client.check_health().await.is_ok() && self.is_running() {
                info!("llama-server is ready");
                return Ok(());
            }
            sleep(READY_POLL_INTERVAL).await;
        }

        Err(InferenceError::RuntimeStartTimeout)
    }

    /// Stop the server process.
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.process.take() {
            info!(pid = child.id(), "Stopping llama-server");
            if let Err(e) = child.kill().await {
                warn!("Error stopping llama-server: {e}");
            }
        }
    }

    /// Check if the server process is running.
    pub fn is_running(&mut self) -> bool {
        if let Some(ref mut child) = self.process {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(?status, "llama-server exited");
                    self.process = None;
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            }
        } else {
            false
        }
    }

    /// Get a client connected to this server.
    pub fn client(&self) -> Result<LlamaCppClient, InferenceError> {
        LlamaCppClient::with_port(self.port)
    }
}
