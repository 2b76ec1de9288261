use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `PsychPal` - a local mental health companion served over HTTP.
#[derive(Parser, Debug)]
#[command(name = "psychpal")]
#[command(version = "0.1.0")]
#[command(about = "A local mental health companion backed by llama.cpp.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.psychpal/config.toml, created on first run)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the model and serve the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// GGUF model file to load
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Talk to the companion from the terminal
    Chat {
        /// Single message mode (don't enter interactive mode)
        #[arg(short, long)]
        message: Option<String>,

        /// GGUF model file to load
        #[arg(long)]
        model: Option<String>,
    },

    /// Wait until a running server answers GET /health
    Health {
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:9090")]
        url: String,

        /// Attempts before giving up
        #[arg(long, default_value = "20")]
        retries: u32,

        /// Seconds between attempts
        #[arg(long, default_value = "2")]
        interval_secs: u64,
    },
}
