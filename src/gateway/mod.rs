//! Axum-based HTTP gateway with body limits, timeouts, CORS and graceful shutdown.
//!
//! Routes:
//! - `GET /health`: liveness, always `{"status": "ok"}`
//! - `POST /predict`: one conversation turn
//! - `GET /shutdown`: stop the process after this response is delivered

mod handlers;
mod server;
mod shutdown;

pub use server::{build_app, is_public_bind, run_gateway, run_gateway_with_listener};
pub use shutdown::ShutdownSignal;

use crate::conversation::ConversationManager;
use std::sync::Arc;

#[cfg(test)]
use handlers::{handle_health, handle_predict, handle_shutdown};

/// Maximum request body size (64KB) -- prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConversationManager>,
    pub shutdown: ShutdownSignal,
}

/// `/predict` request body
#[derive(serde::Deserialize, serde::Serialize)]
pub struct PredictBody {
    pub input: String,
}

/// `/predict` response body
#[derive(serde::Deserialize, serde::Serialize)]
pub struct PredictReply {
    pub response: String,
}
