//! In-process session store.
//!
//! Holds records in a concurrent map inside one process: everything is lost
//! on restart and invisible to other instances, so this backend is a
//! degraded/fallback mode. Nothing reclaims memory for us, so every write
//! sweeps expired entries first.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::Result;
use crate::model::SessionRecord;

use super::{new_session_id, SessionStore};

struct StoredEntry {
    record: SessionRecord,
    inserted_at: Instant,
    ttl: Duration,
}

impl StoredEntry {
    fn expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Process-local session store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Triggered on each write.
    fn sweep(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "swept expired sessions");
        }
    }

    /// Number of live entries (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put(&self, mut record: SessionRecord, ttl: Duration) -> Result<String> {
        self.sweep();
        let sid = new_session_id();
        record.session_id = sid.clone();
        self.entries.insert(
            sid.clone(),
            StoredEntry {
                record,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        Ok(sid)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        // The shard read guard must be released before removing the key,
        // otherwise remove() deadlocks on the same shard.
        match self.entries.get(session_id) {
            None => return Ok(None),
            Some(entry) if !entry.expired() => return Ok(Some(entry.record.clone())),
            Some(_) => {}
        }
        self.entries.remove(session_id);
        Ok(None)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
