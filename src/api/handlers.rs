//! HTTP request handlers

use super::types::{ErrorResponse, Update, WebhookResponse};
use super::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(health))
        // Platform updates; the token in the path authenticates the caller
        .route("/webhook/:token", post(webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    "✅ FlexTeaBot is running"
}

async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    if token.as_str() != &*state.webhook_token {
        tracing::warn!("Webhook called with wrong token");
        return Err(AppError::Unauthorized);
    }

    let update: Update = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid update: {e}")))?;

    match update.text_event() {
        Some((user, text)) => {
            // Acknowledge now; deliveries finish in the background
            let _delivery = state.dispatcher.handle_inbound(user, text).await;
            tracing::debug!(update_id = update.update_id, "Update handled");
        }
        None => tracing::debug!(update_id = update.update_id, "Ignoring non-text update"),
    }

    Ok(Json(WebhookResponse { ok: true }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Unauthorized,
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
