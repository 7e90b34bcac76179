//! TTL cache used by the organization resolver.
//!
//! Explicit and injectable: the clock comes from outside so tests can
//! expire entries without sleeping, and invalidation is a first-class
//! operation rather than waiting out the TTL.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use netbill_core::Clock;

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, Entry { value, expires_at });
        }
    }

    /// Drop one key immediately (deactivation, deletion).
    pub fn invalidate(&self, key: &K) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    pub fn purge_expired(&self) {
        let now = self.clock.now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| entry.expires_at > now);
        }
    }
}
