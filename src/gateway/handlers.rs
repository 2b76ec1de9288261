use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::{AppState, PredictBody, PredictReply};
use crate::error::PalError;

/// GET /health: always ok, no side effects
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /predict: run one conversation turn
pub(super) async fn handle_predict(
    State(state): State<AppState>,
    body: Result<Json<PredictBody>, JsonRejection>,
) -> axum::response::Response {
    let request_id = Uuid::new_v4();

    let Json(predict) = match body {
        Ok(b) => b,
        Err(e) => {
            warn!(%request_id, "rejected malformed predict body: {e}");
            let err = serde_json::json!({
                "error": format!("Invalid request: {}. Expected: {{\"input\": \"...\"}}", e.body_text())
            });
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    info!(%request_id, chars = predict.input.chars().count(), "predict request");

    let span = info_span!("predict", %request_id);
    match state
        .manager
        .handle_turn(&predict.input)
        .instrument(span)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(PredictReply { response })).into_response(),
        Err(PalError::Inference(e)) if e.is_timeout() => {
            error!(%request_id, "predict timed out: {e}");
            let err = serde_json::json!({"error": "inference timed out"});
            (StatusCode::GATEWAY_TIMEOUT, Json(err)).into_response()
        }
        Err(PalError::Inference(e)) => {
            error!(%request_id, "predict inference error: {e}");
            let err = serde_json::json!({"error": "inference failed"});
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
        Err(e) => {
            error!(%request_id, "predict internal error: {e}");
            let err = serde_json::json!({"error": "internal error"});
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

/// GET /shutdown: request a graceful stop
///
/// The server drains in-flight responses, this one included, before
/// `axum::serve` returns.
pub(super) async fn handle_shutdown(State(state): State<AppState>) -> impl IntoResponse {
    info!("shutdown requested over HTTP");
    state.shutdown.trigger();
    Json(serde_json::json!({"status": "shutting down"}))
}
