//! TTL-bounded session storage.
//!
//! One trait, two backends: a process-local map ([`MemoryStore`]) and Redis
//! ([`RedisStore`]). The workflow is backend-agnostic; selection happens at
//! startup from config. Stores are explicit instances injected into the
//! workflow, never module-level singletons, so tests construct isolated
//! stores.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::SessionRecord;

/// Generate a fresh session id: a uuid v4 rendered without hyphens.
///
/// 122 bits of CSPRNG entropy; the id is the sole access credential for a
/// session, so a random+timestamp concatenation is not enough.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Time-bounded storage of session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a record under a freshly generated id, expiring after `ttl`.
    /// Returns the id. The record's `session_id` field is stamped with it.
    async fn put(&self, record: SessionRecord, ttl: Duration) -> Result<String>;

    /// Look up a record. `Ok(None)` covers missing, expired, and malformed
    /// ids alike; `Err` is reserved for backend failures (unreachable store,
    /// corrupt payload). Reads never refresh the TTL.
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_ids_are_distinct() {
        let ids: HashSet<String> = (0..100).map(|_| new_session_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_session_id_is_opaque_hex() {
        let id = new_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
