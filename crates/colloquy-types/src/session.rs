//! Session and transcript types for Colloquy.
//!
//! A session is one end-to-end assessment conversation. Its transcript is
//! an ordered sequence of messages whose `position` column defines the
//! canonical conversation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::analysis::AnalysisRecord;

/// Who spoke a transcript message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('participant', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Participant,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Participant => write!(f, "participant"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            // Chat clients commonly send "user" for the human side.
            "participant" | "user" => Ok(MessageRole::Participant),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// One assessment conversation between a participant and a role-played character.
///
/// Immutable once created, except by cascading deletes. Owns an ordered
/// transcript and at most one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub scenario_id: String,
    pub created_at: DateTime<Utc>,
}

/// A single message within a session transcript.
///
/// `position` is unique per session and non-negative; reading all messages
/// ordered by `position` ascending reproduces the conversation in the order
/// it occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub position: i64,
}

/// A client-supplied message before positions are assigned.
///
/// Used by the replace-transcript operation: the stored `position` becomes
/// the index of the draft in the submitted sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDraft {
    pub role: String,
    pub content: String,
}

/// One row of the staff dashboard listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// First participant message, truncated; empty if the participant never spoke.
    pub summary: String,
}

/// Full view of one session: transcript, analysis-or-none, creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub scenario_id: String,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<TranscriptMessage>,
    pub analysis: Option<AnalysisRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::Participant, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_user_alias() {
        let parsed: MessageRole = "user".parse().unwrap();
        assert_eq!(parsed, MessageRole::Participant);
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        assert!("system".parse::<MessageRole>().is_err());
        assert!("".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        let role = MessageRole::Participant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"participant\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Participant);
    }

    #[test]
    fn test_transcript_message_serialize() {
        let msg = TranscriptMessage {
            id: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            role: MessageRole::Assistant,
            content: "Hey, can we chat?".to_string(),
            position: 0,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
        assert!(json.contains("\"position\":0"));
    }

    #[test]
    fn test_session_view_serializes_null_analysis() {
        let view = SessionView {
            id: Uuid::now_v7(),
            scenario_id: "workplace-conflict".to_string(),
            created_at: Utc::now(),
            transcript: Vec::new(),
            analysis: None,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"analysis\":null"));
    }
}
