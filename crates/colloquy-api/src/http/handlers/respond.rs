//! Stateless conversation turn handler.
//!
//! Produces the character's next line from the scenario, the client-held
//! transcript, and the new participant utterance. Nothing is persisted
//! here: the client saves the grown transcript afterward via the
//! replace-transcript endpoint.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use colloquy_types::error::SessionError;
use colloquy_types::session::{MessageDraft, MessageRole, TranscriptMessage};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a conversation turn.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub scenario_id: String,
    /// The conversation so far, oldest first.
    #[serde(default)]
    pub messages: Vec<MessageDraft>,
    /// The participant's new utterance.
    pub message: String,
}

/// POST /api/v1/respond - Generate the character's next reply.
pub async fn respond(
    State(state): State<AppState>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let scenario = state
        .sessions
        .catalog()
        .get(&body.scenario_id)
        .ok_or_else(|| SessionError::ScenarioNotFound(body.scenario_id.clone()))?
        .clone();

    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message is empty".to_string()));
    }

    // Synthetic ids: this endpoint persists nothing, the transcript only
    // shapes the model context.
    let conversation_id = Uuid::now_v7();
    let mut prior = Vec::with_capacity(body.messages.len());
    for (index, draft) in body.messages.iter().enumerate() {
        let role: MessageRole = draft
            .role
            .parse()
            .map_err(|e: String| AppError::Validation(format!("message {index}: {e}")))?;
        prior.push(TranscriptMessage {
            id: Uuid::now_v7(),
            session_id: conversation_id,
            role,
            content: draft.content.clone(),
            position: index as i64,
        });
    }

    let reply = state
        .turn_engine
        .next_turn(&scenario, &prior, &body.message)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"reply": reply}), request_id, elapsed);

    Ok(Json(resp))
}
