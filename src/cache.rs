use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use crate::services::Clock;

pub const CACHE_TTL_SECONDS: i64 = 60;

struct CacheEntry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// Serialized feed pages keyed by query parameters. Expired entries are
/// only evicted when their own key is read again; there is no size bound.
pub struct ResponseCache {
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, TimeDelta::seconds(CACHE_TTL_SECONDS))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, payload: String) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries()
            .insert(key, CacheEntry { payload, expires_at });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn compute_key(window_days: u32, limit: u32, cursor: Option<&str>) -> String {
        format!(
            "window={window_days}&limit={limit}&cursor={}",
            cursor.unwrap_or_default()
        )
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
