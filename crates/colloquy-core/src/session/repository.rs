//! SessionRepository trait definition.
//!
//! The persistence port for sessions, transcripts, and analyses.
//! Implementations live in colloquy-infra (e.g., `SqliteSessionRepository`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use colloquy_types::analysis::AnalysisRecord;
use colloquy_types::error::RepositoryError;
use colloquy_types::session::{Session, SessionSummary, TranscriptMessage};
use uuid::Uuid;

/// Repository trait for session, transcript, and analysis persistence.
pub trait SessionRepository: Send + Sync {
    /// Insert a session and its position-0 opening message in one
    /// transaction. Either both rows exist afterwards or neither does.
    fn create_session(
        &self,
        session: &Session,
        opening: &TranscriptMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// List all sessions newest first, each with the first participant
    /// message (untruncated) as its derived summary.
    fn list_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;

    /// Get a session's messages ordered by `position` ascending -- the
    /// canonical conversation order.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<TranscriptMessage>, RepositoryError>> + Send;

    /// Replace a session's entire transcript in one transaction: delete
    /// all existing messages, then insert the given sequence. Concurrent
    /// readers observe the pre- or post-replace state, never a mixture.
    fn replace_messages(
        &self,
        session_id: &Uuid,
        messages: &[TranscriptMessage],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a session, cascading to its messages and analysis.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert the analysis row for a session, or update it in place if one
    /// already exists. Atomic: concurrent upserts for the same session
    /// converge to a single row with the later write's content.
    fn upsert_analysis(
        &self,
        record: &AnalysisRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the analysis for a session, if one has been persisted.
    fn get_analysis(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<AnalysisRecord>, RepositoryError>> + Send;
}
