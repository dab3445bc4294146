//! Speech endpoints: transcription (speech-to-text) and synthesis
//! (text-to-speech).

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use uuid::Uuid;

use colloquy_types::error::{SpeechError, VoiceError};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for speech synthesis.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

/// POST /api/v1/speech/transcriptions - Transcribe uploaded audio.
///
/// The raw request body is the audio; any container format ffmpeg can
/// read is accepted. 400 on an empty body, 503 when the engine binary is
/// not present.
pub async fn transcribe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.is_empty() {
        return Err(AppError::Speech(SpeechError::NoAudio));
    }

    let text = state.transcriber.transcribe(&body).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"text": text}), request_id, elapsed);

    Ok(Json(resp))
}

/// POST /api/v1/speech/synthesis - Synthesize bounded text into audio.
///
/// The audio bytes are base64-encoded for JSON transport. 400 on
/// missing/too-long text, 500 when the voice service is unconfigured or
/// fails.
pub async fn synthesize(
    State(state): State<AppState>,
    Json(body): Json<SynthesizeRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Some(voice) = state.voice.as_ref() else {
        return Err(AppError::Voice(VoiceError::Unconfigured));
    };

    let audio = voice.synthesize(&body.text).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({
            "audio": BASE64.encode(&audio),
            "content_type": colloquy_infra::speech::voice::AUDIO_CONTENT_TYPE,
        }),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}
