use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use std::io::BufRead;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::info;

use psychpal::Config;
use psychpal::conversation::ConversationManager;
use psychpal::gateway::{self, AppState, ShutdownSignal};
use psychpal::inference::{self, CompletionModel, LlamaCppModel};

use super::health::wait_for_health;

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Load the model and build the manager, giving up early once `shutdown` trips.
async fn load_manager(
    config: &Config,
    shutdown: &ShutdownSignal,
) -> Result<(Arc<LlamaCppModel>, Arc<ConversationManager>)> {
    let model = Arc::new(
        inference::load_model_until(&config.model, shutdown.wait())
            .await
            .context("load completion model")?,
    );
    let manager = match ConversationManager::from_config(
        Arc::clone(&model) as Arc<dyn CompletionModel>,
        &config.generation,
    ) {
        Ok(manager) => manager,
        Err(e) => {
            model.shutdown().await;
            return Err(e).context("compile prompt template");
        }
    };
    Ok((model, Arc::new(manager)))
}

/// Signal handlers go in before the model load so a stop request during a
/// slow startup still tears the runtime down.
fn install_shutdown() -> ShutdownSignal {
    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();
    shutdown
}

/// Load the model, serve the HTTP API until shutdown, then stop the runtime.
async fn run_serve(config: Config) -> Result<()> {
    let shutdown = install_shutdown();
    let (model, manager) = match load_manager(&config, &shutdown).await {
        Ok(loaded) => loaded,
        Err(_) if shutdown.is_triggered() => {
            info!("stopped before the model finished loading");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let state = AppState {
        manager,
        shutdown,
    };
    let served = gateway::run_gateway(&config.gateway, state).await;

    model.shutdown().await;
    served
}

/// Drive the conversation from the terminal, one line per turn.
async fn run_chat(config: Config, message: Option<String>) -> Result<()> {
    let shutdown = install_shutdown();
    let (model, manager) = match load_manager(&config, &shutdown).await {
        Ok(loaded) => loaded,
        Err(_) if shutdown.is_triggered() => return Ok(()),
        Err(e) => return Err(e),
    };

    let outcome = tokio::select! {
        outcome = chat(&manager, message) => outcome,
        () = shutdown.wait() => Ok(()),
    };

    model.shutdown().await;
    outcome
}

async fn chat(manager: &ConversationManager, message: Option<String>) -> Result<()> {
    match message {
        Some(message) => {
            let reply = manager.handle_turn(&message).await?;
            println!("{reply}");
            Ok(())
        }
        None => chat_repl(manager).await,
    }
}

/// Forward stdin lines from a plain thread. A blocking read parked in the
/// runtime's pool would keep the process alive after a Ctrl-C.
fn stdin_lines() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn chat_repl(manager: &ConversationManager) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin_lines();

    println!("Talk to PsychPal. Press Ctrl+D to quit.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.recv().await else {
            break;
        };
        match manager.handle_turn(&line?).await {
            Ok(reply) => println!("{reply}\n"),
            Err(e) => eprintln!("! {e}\n"),
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            ref host,
            port,
            ref model,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(host) = host {
                config.gateway.host.clone_from(host);
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(model) = model {
                config.model.path.clone_from(model);
            }
            config.validate()?;
            info!(config = %config.config_path.display(), "starting PsychPal server");
            run_serve(config).await
        }
        Commands::Chat {
            ref message,
            ref model,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(model) = model {
                config.model.path.clone_from(model);
            }
            config.validate()?;
            run_chat(config, message.clone()).await
        }
        Commands::Health {
            ref url,
            retries,
            interval_secs,
        } => wait_for_health(url, retries, Duration::from_secs(interval_secs)).await,
    }
}
