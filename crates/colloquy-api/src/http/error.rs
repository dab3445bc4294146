//! Application error type mapping to HTTP status codes and envelope format.
//!
//! The taxonomy: validation problems are 400, unknown sessions/scenarios
//! are 404, bad staff credentials are 401, disabled optional dependencies
//! are 503, external service failures and unexpected store errors are 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use colloquy_types::error::{SessionError, SpeechError, VoiceError};
use colloquy_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session/transcript domain errors.
    Session(SessionError),
    /// Speech-to-text engine errors.
    Speech(SpeechError),
    /// Text-to-speech service errors.
    Voice(VoiceError),
    /// Language-model service errors.
    Llm(LlmError),
    /// Authentication failure on staff routes.
    Unauthorized(String),
    /// Optional dependency not configured; the feature is disabled.
    ServiceUnavailable(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<SpeechError> for AppError {
    fn from(e: SpeechError) -> Self {
        AppError::Speech(e)
    }
}

impl From<VoiceError> for AppError {
    fn from(e: VoiceError) -> Self {
        AppError::Voice(e)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl AppError {
    /// Status, machine-readable code, and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Session(SessionError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Session(SessionError::ScenarioNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "SCENARIO_NOT_FOUND",
                format!("Scenario '{id}' not found"),
            ),
            AppError::Session(
                e @ (SessionError::InvalidScenarioId(_)
                | SessionError::InvalidMessage(_)
                | SessionError::NothingToAnalyze),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Session(SessionError::Storage(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
            AppError::Speech(SpeechError::NoAudio) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                SpeechError::NoAudio.to_string(),
            ),
            AppError::Speech(e @ SpeechError::EngineUnavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                e.to_string(),
            ),
            AppError::Speech(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                e.to_string(),
            ),
            AppError::Voice(e @ (VoiceError::EmptyText | VoiceError::TextTooLong { .. })) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Voice(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                e.to_string(),
            ),
            AppError::Llm(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                e.to_string(),
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
