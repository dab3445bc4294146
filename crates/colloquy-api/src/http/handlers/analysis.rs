//! Analysis trigger handler.
//!
//! The scoring run is fire-and-forget: this handler acknowledges as soon
//! as the background task is scheduled, and the participant-facing flow
//! never blocks on the model call. Re-triggering is always safe -- the
//! pipeline's upsert converges to one analysis row per session.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::handlers::session::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/sessions/{id}/analysis - Schedule a rubric analysis run.
///
/// Responds `accepted` immediately; the result appears later on the
/// session view. A failed background run leaves the analysis absent, and
/// the caller recovers by triggering again.
pub async fn request_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.analysis.request(sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"status": "accepted", "session_id": session_id}),
        request_id,
        elapsed,
    )
    .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}
