//! Core data types: meaning lines, submissions, and session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed identifier of a meaning line. A result always carries exactly
/// three lines with ids `L1`, `L2`, `L3` in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineId {
    L1,
    L2,
    L3,
}

impl LineId {
    /// The required id sequence for a complete result.
    pub const ORDERED: [LineId; 3] = [LineId::L1, LineId::L2, LineId::L3];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineId::L1 => "L1",
            LineId::L2 => "L2",
            LineId::L3 => "L3",
        }
    }
}

/// One generated line of meaning: a short title and a single-paragraph body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningLine {
    pub id: LineId,
    pub title: String,
    pub body: String,
}

/// A user-submitted dream narrative plus optional regeneration context.
///
/// `retry` and `previous_lines` are advisory prompt context only; they never
/// participate in output validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DreamSubmission {
    pub dream_text: String,
    #[serde(default)]
    pub retry: bool,
    #[serde(default)]
    pub previous_lines: Vec<MeaningLine>,
}

/// The stored result of one submission. Write-once: created at submit time,
/// never mutated, removed only by TTL expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque lookup key. Empty until the store assigns one in `put`.
    pub session_id: String,
    pub dream_text: String,
    pub lines: Vec<MeaningLine>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record for an accepted submission, timestamped now.
    /// The session id is assigned by the store on write.
    pub fn new(dream_text: String, lines: Vec<MeaningLine>) -> Self {
        Self {
            session_id: String::new(),
            dream_text,
            lines,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_id_serializes_as_bare_string() {
        assert_eq!(serde_json::to_string(&LineId::L1).unwrap(), r#""L1""#);
        assert_eq!(serde_json::to_string(&LineId::L3).unwrap(), r#""L3""#);
    }

    #[test]
    fn test_line_id_ordered_sequence() {
        let ids: Vec<&str> = LineId::ORDERED.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "L2", "L3"]);
    }

    #[test]
    fn test_meaning_line_roundtrip() {
        let line = MeaningLine {
            id: LineId::L2,
            title: "Rising water".into(),
            body: "Maybe the flood points to feelings that have been building.".into(),
        };
        let json = serde_json::to_string(&line).unwrap();
        let back: MeaningLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_submission_optional_fields_default() {
        let sub: DreamSubmission =
            serde_json::from_str(r#"{"dream_text": "a dream"}"#).unwrap();
        assert!(!sub.retry);
        assert!(sub.previous_lines.is_empty());
    }

    #[test]
    fn test_session_record_starts_without_id() {
        let record = SessionRecord::new("a long dream".into(), Vec::new());
        assert!(record.session_id.is_empty());
        assert!(record.created_at <= Utc::now());
    }
}
