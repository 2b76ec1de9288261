use crate::error::ConfigError;
use crate::inference::{DEFAULT_STOP_SEQUENCES, GenerationParams};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 9090)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Allow binding to non-localhost addresses (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
    /// Browser origins allowed to call the API with credentials
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Whole-request deadline; must exceed `generation.timeout_secs`
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    9090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".into(),
        "http://localhost:3001".into(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            allow_public_bind: false,
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ── Model runtime ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// GGUF model file; `~` is expanded, relative paths resolve against the working directory
    #[serde(default = "default_model_path")]
    pub path: String,
    /// llama.cpp server executable (bare names are looked up on PATH)
    #[serde(default = "default_server_binary")]
    pub server_binary: String,
    /// Attach to an already running llama.cpp server instead of spawning one
    #[serde(default)]
    pub server_url: Option<String>,
    /// Port for the spawned runtime (default: 11435)
    #[serde(default = "default_runtime_port")]
    pub port: u16,
    /// Context window passed to the runtime (default: 2048)
    #[serde(default = "default_ctx_size")]
    pub ctx_size: u32,
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
}

fn default_model_path() -> String {
    "models/tinyllama-1.1b-chat-v1.0.Q4_0.gguf".into()
}

fn default_server_binary() -> String {
    "llama-server".into()
}

fn default_runtime_port() -> u16 {
    11435
}

fn default_ctx_size() -> u32 {
    2048
}

fn default_startup_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            server_binary: default_server_binary(),
            server_url: None,
            port: default_runtime_port(),
            ctx_size: default_ctx_size(),
            startup_timeout_secs: default_startup_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Model path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

// ── Generation ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f64,
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    /// Deadline for a single completion call
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    250
}

fn default_temperature() -> f64 {
    0.5
}

fn default_top_p() -> f64 {
    0.85
}

fn default_repeat_penalty() -> f64 {
    1.2
}

fn default_stop() -> Vec<String> {
    DEFAULT_STOP_SEQUENCES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_generation_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repeat_penalty: default_repeat_penalty(),
            stop: default_stop(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repeat_penalty: self.repeat_penalty,
            stop: self.stop.clone(),
        }
    }
}

// ── Loading / persistence ────────────────────────────────────────

impl Config {
    /// Load `~/.psychpal/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let psychpal_dir = home.join(".psychpal");
        let config_path = psychpal_dir.join("config.toml");

        if !psychpal_dir.exists() {
            fs::create_dir_all(&psychpal_dir).context("Failed to create .psychpal directory")?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit config file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&contents)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .context("Failed to parse config file")
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("PSYCHPAL_MODEL_PATH") {
            if !path.is_empty() {
                self.model.path = path;
            }
        }

        if let Ok(url) = std::env::var("PSYCHPAL_SERVER_URL") {
            if !url.is_empty() {
                self.model.server_url = Some(url);
            }
        }

        if let Ok(host) = std::env::var("PSYCHPAL_HOST") {
            if !host.is_empty() {
                self.gateway.host = host;
            }
        }

        if let Ok(port) = std::env::var("PSYCHPAL_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.gateway.port = port;
            } else {
                tracing::warn!(value = %port, "ignoring unparsable PSYCHPAL_PORT");
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let g = &self.generation;
        if g.temperature.is_nan() || !(0.0..=2.0).contains(&g.temperature) {
            return Err(ConfigError::Validation(
                "generation.temperature must be in [0.0, 2.0]".into(),
            ));
        }
        if g.top_p.is_nan() || g.top_p <= 0.0 || g.top_p > 1.0 {
            return Err(ConfigError::Validation(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }
        if g.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "generation.max_tokens must be >= 1".into(),
            ));
        }
        if g.repeat_penalty.is_nan() || g.repeat_penalty <= 0.0 {
            return Err(ConfigError::Validation(
                "generation.repeat_penalty must be > 0".into(),
            ));
        }
        if g.stop.is_empty() || g.stop.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "generation.stop must list at least one non-empty sequence".into(),
            ));
        }
        if g.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be >= 1".into(),
            ));
        }
        if self.gateway.request_timeout_secs <= g.timeout_secs {
            return Err(ConfigError::Validation(
                "gateway.request_timeout_secs must exceed generation.timeout_secs".into(),
            ));
        }
        if self.model.ctx_size == 0 {
            return Err(ConfigError::Validation("model.ctx_size must be >= 1".into()));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
