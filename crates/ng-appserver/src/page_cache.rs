use std::collections::BTreeMap;

use ng_source::FxHashMap;

use crate::error::StateError;

/// Fixed-capacity store of restorable pages, evicting the least recently
/// used entry once full.
///
/// Every save or retain stamps the entry with a fresh tick. Eviction takes the
/// lowest tick, so both operations are logarithmic in the capacity.
#[derive(Debug)]
pub struct PageCache<V> {
    capacity: usize,
    entries: FxHashMap<String, (u64, V)>,
    /// Keys by the tick they were last used at.
    order: BTreeMap<u64, String>,
    tick: u64,
}

impl<V> PageCache<V> {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: FxHashMap::default(),
            order: BTreeMap::new(),
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Store `value` under a new key. An existing entry is never replaced.
    pub fn save(&mut self, key: &str, value: V) -> Result<(), StateError> {
        if self.entries.contains_key(key) {
            return Err(StateError::DuplicateKey(key.to_string()));
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, evicted)) = self.order.pop_first() {
                self.entries.remove(&evicted);
                tracing::debug!(context_id = %evicted, capacity = self.capacity, "evicted page");
            }
        }

        let tick = self.next_tick();
        self.entries.insert(key.to_string(), (tick, value));
        self.order.insert(tick, key.to_string());
        Ok(())
    }

    /// Look up an entry without affecting eviction order.
    #[must_use]
    pub fn restore(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|(_, value)| value)
    }

    /// Mark an entry as most recently used.
    pub fn retain(&mut self, key: &str) -> Result<(), StateError> {
        let tick = self.next_tick();
        let Some((last_used, _)) = self.entries.get_mut(key) else {
            return Err(StateError::MissingKey(key.to_string()));
        };
        let previous = std::mem::replace(last_used, tick);
        if let Some(key) = self.order.remove(&previous) {
            self.order.insert(tick, key);
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_save_keeps_first() {
        let mut cache = PageCache::new(10);
        cache.save("1", "first").unwrap();
        assert_eq!(
            cache.save("1", "second"),
            Err(StateError::DuplicateKey("1".to_string()))
        );
        assert_eq!(cache.restore("1"), Some(&"first"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = PageCache::new(2);
        cache.save("1", 1).unwrap();
        cache.save("2", 2).unwrap();
        cache.save("3", 3).unwrap();
        assert!(!cache.contains("1"));
        assert!(cache.contains("2"));
        assert!(cache.contains("3"));
    }

    #[test]
    fn test_retain_promotes() {
        let mut cache = PageCache::new(2);
        cache.save("1", 1).unwrap();
        cache.save("2", 2).unwrap();
        cache.retain("1").unwrap();
        cache.save("3", 3).unwrap();
        assert!(cache.contains("1"));
        assert!(!cache.contains("2"));
    }

    #[test]
    fn test_repeated_retains_keep_one_slot_per_entry() {
        let mut cache = PageCache::new(3);
        cache.save("1", 1).unwrap();
        cache.save("2", 2).unwrap();
        cache.save("3", 3).unwrap();
        for key in ["1", "2", "1", "1", "3", "2"] {
            cache.retain(key).unwrap();
        }
        assert_eq!(cache.order.len(), 3);

        cache.save("4", 4).unwrap();
        assert!(!cache.contains("1"));
        cache.save("5", 5).unwrap();
        assert!(!cache.contains("3"));
        assert!(cache.contains("2"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_restore_does_not_promote() {
        let mut cache = PageCache::new(2);
        cache.save("1", 1).unwrap();
        cache.save("2", 2).unwrap();
        assert_eq!(cache.restore("1"), Some(&1));
        cache.save("3", 3).unwrap();
        assert_eq!(cache.restore("1"), None);
    }

    #[test]
    fn test_retain_missing() {
        let mut cache: PageCache<u8> = PageCache::new(1);
        assert_eq!(
            cache.retain("nope"),
            Err(StateError::MissingKey("nope".to_string()))
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = PageCache::new(0);
        cache.save("a", ()).unwrap();
        cache.save("b", ()).unwrap();
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }
}
