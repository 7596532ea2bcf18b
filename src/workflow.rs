//! Submit/fetch orchestration.
//!
//! The workflow owns the input constraints and the order of operations:
//! validate input → generate → validate output → store. Both user-facing
//! operations share only the store; a fresh id per submission means no two
//! requests ever contend over a key.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{DreamError, Result};
use crate::model::{DreamSubmission, SessionRecord};
use crate::prompt::build_generation_request;
use crate::provider::GenerationProvider;
use crate::store::SessionStore;
use crate::validator::validate_lines;

/// Minimum trimmed dream length. Shorter input is rejected before any
/// network call or store write.
pub const MIN_DREAM_CHARS: usize = 40;

/// Orchestrates the two user-facing operations end to end.
pub struct SessionWorkflow {
    provider: Arc<dyn GenerationProvider>,
    store: Arc<dyn SessionStore>,
    session_ttl: Duration,
    max_output_tokens: u32,
}

impl SessionWorkflow {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn SessionStore>,
        session_ttl: Duration,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            provider,
            store,
            session_ttl,
            max_output_tokens,
        }
    }

    /// Run one submission: returns the session id for a later fetch.
    ///
    /// One generation attempt per call. A caller wanting diversified output
    /// resubmits with `retry` and `previous_lines` set; that is a new
    /// logical attempt, not an internal retry loop.
    pub async fn submit(&self, submission: DreamSubmission) -> Result<String> {
        let dream = submission.dream_text.trim();
        if dream.chars().count() < MIN_DREAM_CHARS {
            return Err(DreamError::DreamTooShort);
        }

        let request = build_generation_request(
            dream,
            submission.retry,
            &submission.previous_lines,
            self.max_output_tokens,
        );

        debug!(
            provider = self.provider.name(),
            retry = submission.retry,
            "requesting meaning lines"
        );
        let raw = self.provider.generate(&request).await?;

        let lines = validate_lines(&raw).inspect_err(|e| {
            warn!(error = %e, "generation output failed validation");
        })?;

        let record = SessionRecord::new(dream.to_string(), lines);
        let sid = self.store.put(record, self.session_ttl).await?;
        info!(%sid, store = self.store.name(), "session stored");
        Ok(sid)
    }

    /// Look up a stored session by id.
    ///
    /// Absent and expired sessions are deliberately indistinguishable; only
    /// a backend failure surfaces differently.
    pub async fn fetch(&self, session_id: &str) -> Result<SessionRecord> {
        let sid = session_id.trim();
        if sid.is_empty() {
            return Err(DreamError::MissingSessionId);
        }

        match self.store.get(sid).await? {
            Some(record) => Ok(record),
            None => Err(DreamError::SessionNotFound),
        }
    }
}
