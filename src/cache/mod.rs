use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{Language, MediaKind};

pub mod macros;

/// Default number of entries kept before the least recently used is evicted
pub const DEFAULT_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Browse or discover listing
    Content {
        kind: MediaKind,
        category: String,
        region: Option<String>,
        language: Language,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Content {
                kind,
                category,
                region,
                language,
            } => write!(
                f,
                "content:{}:{}:{}:{}",
                kind,
                category,
                region.as_deref().unwrap_or("-"),
                language.code()
            ),
        }
    }
}

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

struct LruStore {
    capacity: usize,
    entries: HashMap<String, Entry>,
    /// Most recently used key at the back
    order: VecDeque<String>,
}

impl LruStore {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// Process-wide in-memory LRU cache with per-entry TTL.
///
/// Values are stored as JSON so one cache can hold any serializable type.
#[derive(Clone)]
pub struct Cache {
    store: Arc<Mutex<LruStore>>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(LruStore {
                capacity: capacity.max(1),
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Retrieves a value by key, or `None` on a miss or an expired entry.
    pub fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let key = key.to_string();
        let mut store = self.store.lock();

        let value = match store.entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => entry.value.clone(),
            Some(_) => {
                store.remove(&key);
                return Ok(None);
            }
            None => return Ok(None),
        };
        store.touch(&key);
        drop(store);

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))
    }

    /// Stores a value for `ttl` seconds, evicting the least recently used
    /// entry when full. Serialization failures are logged and skipped.
    pub fn insert<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let key = key.to_string();
        let mut store = self.store.lock();

        if store.entries.contains_key(&key) {
            store.touch(&key);
        } else {
            while store.entries.len() >= store.capacity {
                let Some(oldest) = store.order.pop_front() else {
                    break;
                };
                store.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "Evicted cache entry");
            }
            store.order.push_back(key.clone());
        }

        store.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl),
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.store.lock().entries.len()
    }
}
