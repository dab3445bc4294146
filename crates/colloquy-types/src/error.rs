use thiserror::Error;

/// Errors related to session and transcript operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("scenario '{0}' not found")]
    ScenarioNotFound(String),

    #[error("invalid scenario id: {0}")]
    InvalidScenarioId(String),

    #[error("invalid transcript message: {0}")]
    InvalidMessage(String),

    #[error("transcript has no participant turns to analyze")]
    NothingToAnalyze,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => SessionError::NotFound,
            other => SessionError::Storage(other.to_string()),
        }
    }
}

/// Errors from repository operations (used by trait definitions in colloquy-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the speech-to-text engine.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no audio data provided")]
    NoAudio,

    #[error("speech engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("audio conversion failed: {0}")]
    Conversion(String),

    #[error("speech engine timed out after {0}s")]
    Timeout(u64),

    #[error("speech engine failed: {0}")]
    Failed(String),
}

/// Errors from the text-to-speech service.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice service is not configured")]
    Unconfigured,

    #[error("text is empty")]
    EmptyText,

    #[error("text too long: {len} characters (maximum {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("voice service error: {0}")]
    Upstream(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::ScenarioNotFound("workplace-conflict".to_string());
        assert_eq!(err.to_string(), "scenario 'workplace-conflict' not found");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_repository_not_found_maps_to_session_not_found() {
        let err: SessionError = RepositoryError::NotFound.into();
        assert!(matches!(err, SessionError::NotFound));
    }

    #[test]
    fn test_repository_query_maps_to_storage() {
        let err: SessionError = RepositoryError::Query("locked".to_string()).into();
        assert!(matches!(err, SessionError::Storage(_)));
    }

    #[test]
    fn test_voice_error_display() {
        let err = VoiceError::TextTooLong { len: 1200, max: 1000 };
        assert!(err.to_string().contains("1200"));
        assert!(err.to_string().contains("1000"));
    }
}
