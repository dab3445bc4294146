//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/sessions                    - Create a session from a scenario
//! - GET  /api/v1/sessions/{id}               - Participant view of one session
//! - PUT  /api/v1/sessions/{id}/transcript    - Replace the session transcript
//! - GET  /api/v1/staff/sessions              - Staff listing (bearer token)
//! - GET  /api/v1/staff/sessions/{id}         - Staff detail view (bearer token)

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use colloquy_types::scenario::Scenario;
use colloquy_types::session::{MessageDraft, SessionSummary, SessionView, TranscriptMessage};

use crate::http::error::AppError;
use crate::http::extractors::auth::StaffAuth;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for session creation.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub scenario_id: String,
}

/// Request body for transcript replacement.
#[derive(Debug, Deserialize)]
pub struct ReplaceTranscriptRequest {
    pub messages: Vec<MessageDraft>,
}

/// Response body for session creation.
#[derive(Debug, serde::Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub scenario: Scenario,
    pub transcript: Vec<TranscriptMessage>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {s}")))
}

/// POST /api/v1/sessions - Create a session and its opening message.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<CreateSessionResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (session, scenario, opening) = state.sessions.create_session(&body.scenario_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        CreateSessionResponse {
            session_id: session.id,
            scenario,
            transcript: vec![opening],
        },
        request_id,
        elapsed,
    )
    .with_link("self", &format!("/api/v1/sessions/{}", session.id))
    .with_link(
        "transcript",
        &format!("/api/v1/sessions/{}/transcript", session.id),
    );

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id} - Transcript, analysis-or-null, creation time.
///
/// Open to the participant: possession of the session id is the
/// capability. The participant polls this endpoint until the analysis
/// appears.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let view = state.sessions.get_view(&sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{session_id}"))
        .with_link("analysis", &format!("/api/v1/sessions/{session_id}/analysis"));

    Ok(Json(resp))
}

/// PUT /api/v1/sessions/{id}/transcript - Replace the whole transcript.
pub async fn replace_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<ReplaceTranscriptRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let stored = state
        .sessions
        .replace_transcript(&sid, &body.messages)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"replaced": true, "count": stored.len()}),
        request_id,
        elapsed,
    )
    .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}

/// GET /api/v1/staff/sessions - Dashboard listing, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
    _auth: StaffAuth,
) -> Result<Json<ApiResponse<Vec<SessionSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.sessions.list_sessions().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(sessions, request_id, elapsed)
        .with_link("self", "/api/v1/staff/sessions");

    Ok(Json(resp))
}

/// GET /api/v1/staff/sessions/{id} - Staff detail view of one session.
pub async fn get_session_staff(
    State(state): State<AppState>,
    _auth: StaffAuth,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let view = state.sessions.get_view(&sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/staff/sessions/{session_id}"));

    Ok(Json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid(&Uuid::now_v7().to_string()).is_ok());
    }
}
