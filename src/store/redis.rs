//! Redis session store.
//!
//! Delegates storage and expiry to Redis: records are written with `SET ..
//! EX`, so the server reclaims them natively and no local sweep exists.
//! Keys are namespaced under a fixed prefix to coexist with other
//! applications on a shared instance. Connectivity and payload failures
//! surface as `StoreUnavailable`, never as a missing record.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::{DreamError, Result};
use crate::model::SessionRecord;

use super::{new_session_id, SessionStore};

/// Fixed namespace for all session keys.
pub const KEY_PREFIX: &str = "dream:session";

/// Session store backed by an external Redis instance.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect and build a managed connection that reconnects on failure.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| DreamError::StoreUnavailable(format!("invalid redis url: {e}")))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| DreamError::StoreUnavailable(format!("redis connect failed: {e}")))?;
        debug!("connected to redis session store");
        Ok(Self { manager })
    }

    fn session_key(session_id: &str) -> String {
        format!("{KEY_PREFIX}:{session_id}")
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn put(&self, mut record: SessionRecord, ttl: Duration) -> Result<String> {
        let sid = new_session_id();
        record.session_id = sid.clone();

        let payload = serde_json::to_string(&record)
            .map_err(|e| DreamError::StoreUnavailable(format!("record encode failed: {e}")))?;

        let mut conn = self.manager.clone();
        // EX 0 is invalid; clamp sub-second TTLs up to one second.
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(Self::session_key(&sid), payload, ttl_secs)
            .await
            .map_err(|e| DreamError::StoreUnavailable(format!("redis write failed: {e}")))?;

        Ok(sid)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let mut conn = self.manager.clone();
        let payload: Option<String> = conn
            .get(Self::session_key(session_id))
            .await
            .map_err(|e| DreamError::StoreUnavailable(format!("redis read failed: {e}")))?;

        match payload {
            None => Ok(None),
            Some(data) => serde_json::from_str(&data)
                .map(Some)
                .map_err(|e| DreamError::StoreUnavailable(format!("record decode failed: {e}"))),
        }
    }

    fn name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_namespaced() {
        assert_eq!(
            RedisStore::session_key("abc123"),
            "dream:session:abc123"
        );
    }

    #[test]
    fn test_stored_payload_roundtrips() {
        // The record travels through Redis as JSON; verify the encoding the
        // store writes is the one it can read back.
        let mut record = SessionRecord::new("a long dream".into(), Vec::new());
        record.session_id = "abc123".into();
        let payload = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&payload).unwrap();
        assert_eq!(back.session_id, "abc123");
        assert_eq!(back.dream_text, "a long dream");
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_redis_is_store_unavailable() {
        // Port 1 is never a Redis server; the error must be the backend
        // failure kind, not a silent None.
        let result = RedisStore::connect("redis://127.0.0.1:1").await;
        assert!(matches!(result, Err(DreamError::StoreUnavailable(_))));
    }
}
