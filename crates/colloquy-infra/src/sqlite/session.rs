//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `colloquy-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, RFC 3339
//! text timestamps. The multi-row operations (create-with-opening,
//! replace-all) run inside writer transactions so concurrent readers only
//! ever see a complete transcript state.

use colloquy_core::session::repository::SessionRepository;
use colloquy_types::analysis::AnalysisRecord;
use colloquy_types::error::RepositoryError;
use colloquy_types::session::{MessageRole, Session, SessionSummary, TranscriptMessage};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    scenario_id: String,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            scenario_id: row.try_get("scenario_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        Ok(Session {
            id: parse_uuid(&self.id)?,
            scenario_id: self.scenario_id,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    position: i64,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            position: row.try_get("position")?,
        })
    }

    fn into_message(self) -> Result<TranscriptMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(TranscriptMessage {
            id: parse_uuid(&self.id)?,
            session_id: parse_uuid(&self.session_id)?,
            role,
            content: self.content,
            position: self.position,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid uuid: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn create_session(
        &self,
        session: &Session,
        opening: &TranscriptMessage,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query("INSERT INTO sessions (id, scenario_id, created_at) VALUES (?, ?, ?)")
            .bind(session.id.to_string())
            .bind(&session.scenario_id)
            .bind(format_datetime(&session.created_at))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        sqlx::query(
            r#"INSERT INTO transcript_messages (id, session_id, role, content, position)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(opening.id.to_string())
        .bind(opening.session_id.to_string())
        .bind(opening.role.to_string())
        .bind(&opening.content)
        .bind(opening.position)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;
        Ok(())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(query_err)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT s.id, s.created_at,
                      COALESCE(
                          (SELECT m.content FROM transcript_messages m
                           WHERE m.session_id = s.id AND m.role = 'participant'
                           ORDER BY m.position ASC LIMIT 1),
                          ''
                      ) AS summary
               FROM sessions s
               ORDER BY s.created_at DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id").map_err(query_err)?;
            let created_at: String = row.try_get("created_at").map_err(query_err)?;
            let summary: String = row.try_get("summary").map_err(query_err)?;

            summaries.push(SessionSummary {
                id: parse_uuid(&id)?,
                created_at: parse_datetime(&created_at)?,
                summary,
            });
        }
        Ok(summaries)
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<TranscriptMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM transcript_messages WHERE session_id = ? ORDER BY position ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row = MessageRow::from_row(row).map_err(query_err)?;
            messages.push(message_row.into_message()?);
        }
        Ok(messages)
    }

    async fn replace_messages(
        &self,
        session_id: &Uuid,
        messages: &[TranscriptMessage],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query("DELETE FROM transcript_messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        for message in messages {
            sqlx::query(
                r#"INSERT INTO transcript_messages (id, session_id, role, content, position)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(message.id.to_string())
            .bind(session_id.to_string())
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(message.position)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn upsert_analysis(&self, record: &AnalysisRecord) -> Result<(), RepositoryError> {
        let report = serde_json::to_string(&record.report)
            .map_err(|e| RepositoryError::Query(format!("report serialization: {e}")))?;

        // Native atomic upsert: no check-then-act window, no duplicate rows.
        sqlx::query(
            r#"INSERT INTO analyses (session_id, report, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET
                   report = excluded.report,
                   updated_at = excluded.updated_at"#,
        )
        .bind(record.session_id.to_string())
        .bind(report)
        .bind(format_datetime(&record.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;
        Ok(())
    }

    async fn get_analysis(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<AnalysisRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM analyses WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session_id_str: String = row.try_get("session_id").map_err(query_err)?;
        let report_str: String = row.try_get("report").map_err(query_err)?;
        let updated_at: String = row.try_get("updated_at").map_err(query_err)?;

        let report: serde_json::Value = serde_json::from_str(&report_str)
            .map_err(|e| RepositoryError::Query(format!("invalid report json: {e}")))?;

        Ok(Some(AnalysisRecord {
            session_id: parse_uuid(&session_id_str)?,
            report,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn test_repo() -> SqliteSessionRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        SqliteSessionRepository::new(DatabasePool::new(&url).await.unwrap())
    }

    fn make_session() -> Session {
        Session {
            id: Uuid::now_v7(),
            scenario_id: "workplace-conflict".to_string(),
            created_at: Utc::now(),
        }
    }

    fn make_message(
        session_id: Uuid,
        role: MessageRole,
        content: &str,
        position: i64,
    ) -> TranscriptMessage {
        TranscriptMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.to_string(),
            position,
        }
    }

    async fn seeded(repo: &SqliteSessionRepository) -> Session {
        let session = make_session();
        let opening = make_message(session.id, MessageRole::Assistant, "Hey, can we chat?", 0);
        repo.create_session(&session, &opening).await.unwrap();
        session
    }

    #[tokio::test]
    async fn create_and_get_session() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;

        let fetched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.scenario_id, "workplace-conflict");

        let messages = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].position, 0);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].content, "Hey, can we chat?");
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let repo = test_repo().await;
        assert!(repo.get_session(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_then_get_round_trips() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;

        let replacement = vec![
            make_message(session.id, MessageRole::Assistant, "Hey, can we chat?", 0),
            make_message(session.id, MessageRole::Participant, "Sure.", 1),
            make_message(session.id, MessageRole::Assistant, "I felt sidelined.", 2),
        ];
        repo.replace_messages(&session.id, &replacement).await.unwrap();

        let fetched = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(fetched.len(), 3);
        for (expected, actual) in replacement.iter().zip(&fetched) {
            assert_eq!(expected.content, actual.content);
            assert_eq!(expected.role, actual.role);
            assert_eq!(expected.position, actual.position);
        }
    }

    #[tokio::test]
    async fn second_replace_fully_wins() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;

        let first = vec![
            make_message(session.id, MessageRole::Assistant, "A", 0),
            make_message(session.id, MessageRole::Participant, "B", 1),
        ];
        let second = vec![make_message(session.id, MessageRole::Assistant, "C", 0)];

        repo.replace_messages(&session.id, &first).await.unwrap();
        repo.replace_messages(&session.id, &second).await.unwrap();

        let fetched = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content, "C");
    }

    #[tokio::test]
    async fn upsert_analysis_twice_keeps_one_row() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;

        let first = AnalysisRecord {
            session_id: session.id,
            report: json!({"summary": "first run"}),
            updated_at: Utc::now(),
        };
        repo.upsert_analysis(&first).await.unwrap();

        let second = AnalysisRecord {
            session_id: session.id,
            report: json!({"summary": "second run"}),
            updated_at: Utc::now(),
        };
        repo.upsert_analysis(&second).await.unwrap();

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM analyses WHERE session_id = ?")
                .bind(session.id.to_string())
                .fetch_one(&repo.pool.reader)
                .await
                .unwrap();
        assert_eq!(count.0, 1);

        let fetched = repo.get_analysis(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.report["summary"], "second run");
    }

    #[tokio::test]
    async fn get_analysis_absent_is_none() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;
        assert!(repo.get_analysis(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_session_cascades() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;
        repo.upsert_analysis(&AnalysisRecord {
            session_id: session.id,
            report: json!({"summary": "x"}),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.delete_session(&session.id).await.unwrap();

        assert!(repo.get_session(&session.id).await.unwrap().is_none());
        assert!(repo.get_messages(&session.id).await.unwrap().is_empty());
        assert!(repo.get_analysis(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_sessions_newest_first_with_first_participant_summary() {
        let repo = test_repo().await;

        let older = Session {
            id: Uuid::now_v7(),
            scenario_id: "workplace-conflict".to_string(),
            created_at: Utc::now() - chrono::Duration::minutes(5),
        };
        repo.create_session(
            &older,
            &make_message(older.id, MessageRole::Assistant, "Hey, can we chat?", 0),
        )
        .await
        .unwrap();
        repo.replace_messages(
            &older.id,
            &[
                make_message(older.id, MessageRole::Assistant, "Hey, can we chat?", 0),
                make_message(older.id, MessageRole::Participant, "Sure, what's up?", 1),
            ],
        )
        .await
        .unwrap();

        let newer = seeded(&repo).await;

        let listed = repo.list_sessions().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[0].summary, "");
        assert_eq!(listed[1].id, older.id);
        assert_eq!(listed[1].summary, "Sure, what's up?");
    }

    #[tokio::test]
    async fn duplicate_position_in_one_replace_rolls_back() {
        let repo = test_repo().await;
        let session = seeded(&repo).await;

        let conflicting = vec![
            make_message(session.id, MessageRole::Assistant, "A", 0),
            make_message(session.id, MessageRole::Participant, "B", 0),
        ];
        assert!(repo.replace_messages(&session.id, &conflicting).await.is_err());

        // The pre-replace transcript is intact -- no partial write.
        let fetched = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content, "Hey, can we chat?");
    }
}
