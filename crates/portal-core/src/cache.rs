//! In-memory response cache with a per-read freshness window.
//!
//! Entries never expire on their own; each `get` decides whether the stored
//! value is still young enough for that caller.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, (V, Instant)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if it was stored less than `max_age` ago.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<V> {
        let entries = self.entries.lock();
        let (value, stored_at) = entries.get(key)?;
        if stored_at.elapsed() < max_age {
            tracing::trace!("Cache hit for {}", key);
            Some(value.clone())
        } else {
            None
        }
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.entries.lock().insert(key.into(), (value, Instant::now()));
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = TtlCache::new();
        cache.set("weather_forecast_-26.2_28.0", 21);
        assert_eq!(
            cache.get("weather_forecast_-26.2_28.0", Duration::from_secs(300)),
            Some(21)
        );
    }

    #[test]
    fn test_stale_entry_is_ignored_but_kept() {
        let cache = TtlCache::new();
        cache.set("football_standings", "table".to_string());
        assert_eq!(cache.get("football_standings", Duration::ZERO), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key_and_clear() {
        let cache: TtlCache<u8> = TtlCache::default();
        assert!(cache.get("nope", Duration::from_secs(60)).is_none());
        cache.set("a", 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = TtlCache::new();
        cache.set("k", 1);
        cache.set("k", 2);
        assert_eq!(cache.get("k", Duration::from_secs(1)), Some(2));
    }
}
