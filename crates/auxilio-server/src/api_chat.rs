//! `/chat` handler for the Auxilio reference backend.

use crate::{AppState, MAX_SESSION_UTTERANCES};
use auxilio_types::wire::{ChatRequest, ChatResponse};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /chat`.
///
/// Folds the utterance into the session's context and classifies over the
/// combined utterances, so follow-up details refine the earlier picture:
/// "me quemé" followed by "tiene una ampolla grande" upgrades the burn
/// tier on the second turn.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    let session_id = payload.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::BadRequest(
            "session_id must not be empty".to_string(),
        ));
    }

    let combined = {
        let mut sessions = state.sessions.write().unwrap_or_else(|e| e.into_inner());
        let context = sessions.entry(session_id.to_string()).or_default();
        context.utterances.push(text.to_string());
        if context.utterances.len() > MAX_SESSION_UTTERANCES {
            context.utterances.remove(0);
        }
        context.utterances.join(" ")
    };

    let response = auxilio_triage::classify(&combined);
    tracing::info!(
        session_id,
        rule = auxilio_triage::matched_rule(&combined).unwrap_or("default"),
        severity = response.severity.as_str(),
        call = response.should_call_emergency,
        profile_attached = payload.user_profile.is_some(),
        "classified utterance"
    );

    Ok(Json(response.into()))
}
