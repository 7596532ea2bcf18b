//! Crate-wide error type and result alias.
//!
//! Every failure path in the workflow maps to exactly one variant, and the
//! API layer maps each variant to exactly one HTTP status. User-correctable
//! rejections (`DreamTooShort`, `MissingSessionId`) are distinct from
//! upstream faults (`MalformedOutput`, `UnexpectedShape`) and from
//! operational failures (`Provider`, `StoreUnavailable`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DreamError>;

#[derive(Debug, Error)]
pub enum DreamError {
    /// Dream text under the minimum length after trimming. Rejected before
    /// any generation call or store write.
    #[error("Dream text is too short. Please add a few more sentences.")]
    DreamTooShort,

    /// Fetch request without a session id.
    #[error("Missing sid")]
    MissingSessionId,

    /// Session absent or expired. The two cases are deliberately
    /// indistinguishable to the caller.
    #[error("Not found or expired")]
    SessionNotFound,

    /// Generation service returned text that does not parse as JSON.
    /// Carries the raw text for diagnostics.
    #[error("generation service returned non-JSON output")]
    MalformedOutput { raw: String },

    /// Generation output parsed but does not match the expected
    /// three-line schema. Carries the parsed value for diagnostics.
    #[error("generation output has unexpected shape")]
    UnexpectedShape { value: serde_json::Value },

    /// Generation service unreachable or returned an error status.
    #[error("generation service error: {0}")]
    Provider(String),

    /// Session store unreachable or failed to (de)serialize a record.
    /// Never conflated with `SessionNotFound`.
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Startup-time configuration failure.
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_matches_api_contract() {
        assert_eq!(DreamError::SessionNotFound.to_string(), "Not found or expired");
    }

    #[test]
    fn test_malformed_output_keeps_raw_text() {
        let err = DreamError::MalformedOutput {
            raw: "Sure! Here is the JSON: {}".into(),
        };
        match err {
            DreamError::MalformedOutput { raw } => assert!(raw.contains("Sure!")),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_store_unavailable_is_distinct_from_not_found() {
        let unavailable = DreamError::StoreUnavailable("connection refused".into());
        assert!(!matches!(unavailable, DreamError::SessionNotFound));
        assert!(unavailable.to_string().contains("connection refused"));
    }
}
