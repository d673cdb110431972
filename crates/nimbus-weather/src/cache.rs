//! Short-lived cache for current-conditions reads.
//!
//! Keyed by lower-cased city name with a 5-minute default TTL. Expiry is
//! lazy (checked on read); [`ConditionsCache::purge_expired`] can be called
//! opportunistically to evict stale entries. Forecasts are never cached —
//! the engine wants once-per-pass freshness per city.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::types::CurrentConditions;

/// Default time-to-live for cached current conditions.
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    conditions: CurrentConditions,
    stored_at: DateTime<Utc>,
}

/// In-process TTL cache for [`CurrentConditions`], keyed by city.
#[derive(Debug)]
pub struct ConditionsCache<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for ConditionsCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS), SystemClock)
    }
}

impl<C: Clock> ConditionsCache<C> {
    /// Creates a cache with the given TTL and clock.
    #[must_use]
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached conditions for a city if present and fresh.
    ///
    /// A stale entry is evicted on the spot.
    #[must_use]
    pub fn get(&self, city: &str) -> Option<CurrentConditions> {
        let key = Self::key(city);
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if now.signed_duration_since(entry.stored_at) < self.ttl => {
                debug!(city = %city, "using cached current conditions");
                Some(entry.conditions.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Stores the conditions for a city, replacing any previous entry.
    pub fn put(&self, city: &str, conditions: CurrentConditions) {
        let mut entries = self.entries.lock();
        entries.insert(
            Self::key(city),
            CacheEntry {
                conditions,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Evicts every entry older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| now.signed_duration_since(e.stored_at) < self.ttl);
        before - entries.len()
    }

    /// Number of entries currently held, stale or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn key(city: &str) -> String {
        city.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::WeatherParameter;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Arc;

    fn conditions(city: &str, temp: f64) -> CurrentConditions {
        let mut values = StdHashMap::new();
        values.insert(WeatherParameter::Temperature, temp);
        CurrentConditions {
            city: city.to_string(),
            observed_at: Utc::now(),
            values,
        }
    }

    fn test_cache() -> (ConditionsCache<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ConditionsCache::new(Duration::minutes(5), Arc::clone(&clock));
        (cache, clock)
    }

    #[test]
    fn miss_on_empty() {
        let (cache, _) = test_cache();
        assert!(cache.get("Berlin").is_none());
    }

    #[test]
    fn hit_within_ttl() {
        let (cache, clock) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));

        clock.advance(Duration::minutes(4));
        let hit = cache.get("Berlin");
        assert!(hit.is_some());
        assert_eq!(
            hit.unwrap().value(WeatherParameter::Temperature),
            Some(21.0)
        );
    }

    #[test]
    fn miss_after_ttl() {
        let (cache, clock) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));

        clock.advance(Duration::minutes(5));
        assert!(cache.get("Berlin").is_none());
        // lazy expiry removed the entry
        assert!(cache.is_empty());
    }

    #[test]
    fn key_is_case_insensitive() {
        let (cache, _) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));

        assert!(cache.get("berlin").is_some());
        assert!(cache.get("BERLIN").is_some());
    }

    #[test]
    fn put_replaces_entry() {
        let (cache, _) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));
        cache.put("Berlin", conditions("Berlin", 25.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("Berlin").unwrap().value(WeatherParameter::Temperature),
            Some(25.0)
        );
    }

    #[test]
    fn purge_expired_sweeps_stale_entries() {
        let (cache, clock) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));

        clock.advance(Duration::minutes(3));
        cache.put("Lisbon", conditions("Lisbon", 30.0));

        clock.advance(Duration::minutes(3));
        // Berlin is 6m old, Lisbon 3m old
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("Lisbon").is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let (cache, _) = test_cache();
        cache.put("Berlin", conditions("Berlin", 21.0));
        cache.put("Lisbon", conditions("Lisbon", 30.0));

        cache.clear();
        assert!(cache.is_empty());
    }
}
