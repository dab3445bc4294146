//! Fire-and-forget analysis pipeline.
//!
//! `request` validates and acknowledges; the scoring work runs in a
//! detached tokio task that outlives the triggering request. The
//! persisted result is written with an atomic upsert, so repeated or
//! overlapping runs for the same session converge to a single row --
//! re-triggering is always safe, and the later completion wins.
//!
//! A failed background run is logged and dropped: no row is written, no
//! retry is scheduled, and the caller (long since answered) learns of it
//! only by observing that the analysis is still absent.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use colloquy_types::analysis::{AnalysisRecord, AnalysisReport, UNPARSED_RESPONSE_FIELD};
use colloquy_types::error::SessionError;
use colloquy_types::llm::{ChatMessage, ChatRole, CompletionRequest};
use colloquy_types::session::MessageRole;

use crate::analysis::prompt::{RUBRIC_SYSTEM_PROMPT, build_rubric_prompt};
use crate::llm::provider::LlmProvider;
use crate::session::repository::SessionRepository;

/// Output cap for the scoring response.
const MAX_REPORT_TOKENS: u32 = 1_024;

/// Scores completed transcripts against the rubric, out of band.
pub struct AnalysisPipeline<R: SessionRepository, P: LlmProvider> {
    repo: Arc<R>,
    provider: Arc<P>,
    model: String,
}

impl<R: SessionRepository, P: LlmProvider> Clone for AnalysisPipeline<R, P> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            provider: Arc::clone(&self.provider),
            model: self.model.clone(),
        }
    }
}

impl<R, P> AnalysisPipeline<R, P>
where
    R: SessionRepository + 'static,
    P: LlmProvider + 'static,
{
    pub fn new(repo: Arc<R>, provider: Arc<P>, model: String) -> Self {
        Self {
            repo,
            provider,
            model,
        }
    }

    /// Validate the session and schedule a background scoring run.
    ///
    /// Returns as soon as the task is spawned; the caller must not wait
    /// for the result. Sessions whose transcript has no participant turn
    /// are rejected with `NothingToAnalyze` -- there is nothing to score
    /// and the model call would be wasted.
    pub async fn request(&self, session_id: Uuid) -> Result<(), SessionError> {
        self.repo
            .get_session(&session_id)
            .await?
            .ok_or(SessionError::NotFound)?;

        let transcript = self.repo.get_messages(&session_id).await?;
        if !transcript
            .iter()
            .any(|m| m.role == MessageRole::Participant)
        {
            return Err(SessionError::NothingToAnalyze);
        }

        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pipeline.run(session_id).await {
                error!(session_id = %session_id, error = %e, "Background analysis run failed");
            }
        });

        info!(session_id = %session_id, "Analysis scheduled");
        Ok(())
    }

    /// One scoring run: read the transcript, call the model, persist.
    ///
    /// Public so operators can run it synchronously (e.g., a backfill
    /// command); the HTTP path always goes through [`request`](Self::request).
    pub async fn run(&self, session_id: Uuid) -> Result<(), SessionError> {
        let transcript = self.repo.get_messages(&session_id).await?;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: build_rubric_prompt(&transcript),
            }],
            system: Some(RUBRIC_SYSTEM_PROMPT.to_string()),
            max_tokens: MAX_REPORT_TOKENS,
            temperature: Some(0.2),
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| SessionError::Storage(format!("scoring call failed: {e}")))?;

        let report = parse_report(&response.content);
        let parsed = report.get(UNPARSED_RESPONSE_FIELD).is_none();

        let record = AnalysisRecord {
            session_id,
            report,
            updated_at: Utc::now(),
        };
        self.repo.upsert_analysis(&record).await?;

        info!(session_id = %session_id, parsed, "Analysis persisted");
        Ok(())
    }
}

/// Parse the model's reply as an [`AnalysisReport`].
///
/// Falls back to `{"unparsed_response": <raw>}` when the reply is not
/// valid JSON, is missing dimensions, or carries out-of-range scores --
/// the raw text is preserved for manual review instead of being discarded.
fn parse_report(raw: &str) -> serde_json::Value {
    let body = strip_code_fences(raw);
    match serde_json::from_str::<AnalysisReport>(body) {
        Ok(report) if report.scores_in_range() => {
            serde_json::to_value(&report).unwrap_or_else(|_| fallback(raw))
        }
        _ => fallback(raw),
    }
}

fn fallback(raw: &str) -> serde_json::Value {
    serde_json::json!({ UNPARSED_RESPONSE_FIELD: raw })
}

/// Models often wrap JSON in Markdown fences despite instructions;
/// strip a single surrounding ``` or ```json fence pair.
fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
