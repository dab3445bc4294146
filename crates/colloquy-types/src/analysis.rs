//! Rubric analysis types for Colloquy.
//!
//! The store treats the analysis report as an opaque structured payload;
//! the typed [`AnalysisReport`] shape is a contract between the analysis
//! pipeline and the scoring model, not enforced by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguished field name used when the scoring model's response could
/// not be parsed. The raw text is preserved under this key for manual
/// review instead of being discarded.
pub const UNPARSED_RESPONSE_FIELD: &str = "unparsed_response";

/// The persisted analysis for a session: at most one per session, updated
/// in place on every subsequent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub session_id: Uuid,
    /// Parsed report or the `unparsed_response` fallback object.
    pub report: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Score, supporting quote, and feedback for a single rubric dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Numeric score in [1, 5].
    pub score: u8,
    /// A quote from the transcript supporting the score.
    pub quote: String,
    /// Free-text feedback for the participant.
    pub feedback: String,
}

/// The structured scoring response the pipeline requests from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "conflict-resolution")]
    pub conflict_resolution: DimensionScore,
    pub professionalism: DimensionScore,
    pub articulation: DimensionScore,
    pub learning: DimensionScore,
    /// Overall summary of the conversation.
    pub summary: String,
}

impl AnalysisReport {
    /// Whether every dimension score falls within the rubric range [1, 5].
    pub fn scores_in_range(&self) -> bool {
        self.dimensions().iter().all(|d| (1..=5).contains(&d.score))
    }

    /// The four fixed rubric dimensions in display order.
    pub fn dimensions(&self) -> [&DimensionScore; 4] {
        [
            &self.conflict_resolution,
            &self.professionalism,
            &self.articulation,
            &self.learning,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(score: u8) -> DimensionScore {
        DimensionScore {
            score,
            quote: "I hear you".to_string(),
            feedback: "Good active listening".to_string(),
        }
    }

    fn report(scores: [u8; 4]) -> AnalysisReport {
        AnalysisReport {
            conflict_resolution: dim(scores[0]),
            professionalism: dim(scores[1]),
            articulation: dim(scores[2]),
            learning: dim(scores[3]),
            summary: "A constructive conversation".to_string(),
        }
    }

    #[test]
    fn test_scores_in_range() {
        assert!(report([1, 3, 4, 5]).scores_in_range());
        assert!(!report([0, 3, 4, 5]).scores_in_range());
        assert!(!report([1, 3, 4, 6]).scores_in_range());
    }

    #[test]
    fn test_report_serde_uses_hyphenated_dimension() {
        let json = serde_json::to_string(&report([3, 3, 3, 3])).unwrap();
        assert!(json.contains("\"conflict-resolution\""));
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.conflict_resolution.score, 3);
    }

    #[test]
    fn test_report_rejects_missing_dimension() {
        let json = r#"{"professionalism":{"score":3,"quote":"","feedback":""},"summary":"x"}"#;
        assert!(serde_json::from_str::<AnalysisReport>(json).is_err());
    }

    #[test]
    fn test_record_holds_fallback_payload() {
        let record = AnalysisRecord {
            session_id: Uuid::now_v7(),
            report: serde_json::json!({ UNPARSED_RESPONSE_FIELD: "not json at all" }),
            updated_at: Utc::now(),
        };
        assert!(record.report.get(UNPARSED_RESPONSE_FIELD).is_some());
    }
}
