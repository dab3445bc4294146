//! Session service: the transcript manager.
//!
//! Validates scenario ids and message drafts at the boundary, assigns
//! transcript positions, and delegates persistence to the repository.
//! The repository's transactions are the unit of consistency; this layer
//! never issues partial writes.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use colloquy_types::error::SessionError;
use colloquy_types::scenario::Scenario;
use colloquy_types::session::{
    MessageDraft, MessageRole, Session, SessionSummary, SessionView, TranscriptMessage,
};

use crate::scenario::catalog::ScenarioCatalog;
use crate::session::repository::SessionRepository;

/// Maximum length of the derived dashboard summary, in characters.
const SUMMARY_MAX_CHARS: usize = 80;

/// Orchestrates session lifecycle and transcript persistence.
pub struct SessionService<R: SessionRepository> {
    repo: R,
    catalog: ScenarioCatalog,
}

impl<R: SessionRepository> SessionService<R> {
    pub fn new(repo: R, catalog: ScenarioCatalog) -> Self {
        Self { repo, catalog }
    }

    /// Access the scenario catalog.
    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    /// Access the session repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Create a session for a scenario, inserting the session row and the
    /// scenario's opening line (position 0) in one transaction.
    ///
    /// Fails with `InvalidScenarioId` when the id is malformed and
    /// `ScenarioNotFound` when it is absent from the catalog; nothing is
    /// written in either case.
    pub async fn create_session(
        &self,
        scenario_id: &str,
    ) -> Result<(Session, Scenario, TranscriptMessage), SessionError> {
        if !is_valid_scenario_id(scenario_id) {
            return Err(SessionError::InvalidScenarioId(format!(
                "'{scenario_id}' contains characters outside [A-Za-z0-9_-]"
            )));
        }
        let scenario = self
            .catalog
            .get(scenario_id)
            .ok_or_else(|| SessionError::ScenarioNotFound(scenario_id.to_string()))?
            .clone();

        let session = Session {
            id: Uuid::now_v7(),
            scenario_id: scenario.id.clone(),
            created_at: Utc::now(),
        };
        let opening = TranscriptMessage {
            id: Uuid::now_v7(),
            session_id: session.id,
            role: MessageRole::Assistant,
            content: scenario.opening_message.clone(),
            position: 0,
        };

        self.repo.create_session(&session, &opening).await?;
        info!(session_id = %session.id, scenario_id = %scenario.id, "Session created");

        Ok((session, scenario, opening))
    }

    /// Get a session's ordered transcript. `NotFound` if the session is absent.
    pub async fn get_transcript(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<TranscriptMessage>, SessionError> {
        self.require_session(session_id).await?;
        Ok(self.repo.get_messages(session_id).await?)
    }

    /// Full view of one session: transcript, analysis-or-none, creation time.
    pub async fn get_view(&self, session_id: &Uuid) -> Result<SessionView, SessionError> {
        let session = self.require_session(session_id).await?;
        let transcript = self.repo.get_messages(session_id).await?;
        let analysis = self.repo.get_analysis(session_id).await?;

        Ok(SessionView {
            id: session.id,
            scenario_id: session.scenario_id,
            created_at: session.created_at,
            transcript,
            analysis,
        })
    }

    /// Replace a session's entire transcript with the given drafts,
    /// assigning `position` = draft index.
    ///
    /// Every draft must carry a recognized role and non-whitespace content;
    /// a single invalid draft rejects the whole request and nothing is
    /// written. The delete-and-insert runs in one repository transaction,
    /// so the stored transcript always equals some complete submission.
    pub async fn replace_transcript(
        &self,
        session_id: &Uuid,
        drafts: &[MessageDraft],
    ) -> Result<Vec<TranscriptMessage>, SessionError> {
        self.require_session(session_id).await?;

        let mut messages = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            let role: MessageRole = draft.role.parse().map_err(|e: String| {
                SessionError::InvalidMessage(format!("message {index}: {e}"))
            })?;
            if draft.content.trim().is_empty() {
                return Err(SessionError::InvalidMessage(format!(
                    "message {index}: content is empty"
                )));
            }
            messages.push(TranscriptMessage {
                id: Uuid::now_v7(),
                session_id: *session_id,
                role,
                content: draft.content.clone(),
                position: index as i64,
            });
        }

        self.repo.replace_messages(session_id, &messages).await?;
        info!(session_id = %session_id, count = messages.len(), "Transcript replaced");
        Ok(messages)
    }

    /// List all sessions newest first with a truncated one-line summary
    /// derived from the first participant message.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = self.repo.list_sessions().await?;
        for summary in &mut summaries {
            summary.summary = truncate_summary(&summary.summary);
        }
        Ok(summaries)
    }

    async fn require_session(&self, session_id: &Uuid) -> Result<Session, SessionError> {
        self.repo
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)
    }
}

/// Scenario ids are restricted to `[A-Za-z0-9_-]` and must be non-empty.
pub fn is_valid_scenario_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Truncate a summary to [`SUMMARY_MAX_CHARS`] characters, on a char
/// boundary, appending an ellipsis when content was dropped.
fn truncate_summary(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= SUMMARY_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut truncated: String = trimmed.chars().take(SUMMARY_MAX_CHARS).collect();
    truncated.push('…');
    truncated
}
