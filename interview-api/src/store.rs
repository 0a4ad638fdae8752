//! Keyed in-memory storage.
//!
//! Handlers only see [`KeyValueStore`], so a persistent backend can replace
//! [`MemoryStore`] without touching them.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rand::{Rng, distributions::Alphanumeric};

pub trait KeyValueStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn put(&self, key: &str, value: V);
    fn delete(&self, key: &str) -> Option<V>;
    /// Mutate the value under `key` in place. Returns `false` when absent.
    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut V)) -> bool;
}

/// Process-wide map with no eviction.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> KeyValueStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn put(&self, key: &str, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key)
    }

    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut V)) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(value) => {
                apply(value);
                true
            }
            None => false,
        }
    }
}

/// Random lowercase alphanumeric identifier for stored records.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(20)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert_eq!(store.get("a"), None);

        store.put("a", "one".to_string());
        assert_eq!(store.get("a").as_deref(), Some("one"));

        store.put("a", "two".to_string());
        assert_eq!(store.delete("a").as_deref(), Some("two"));
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn update_mutates_in_place_only_when_present() {
        let store: MemoryStore<Vec<u32>> = MemoryStore::new();
        assert!(!store.update("missing", &mut |v| v.push(1)));

        store.put("k", vec![1]);
        assert!(store.update("k", &mut |v| v.push(2)));
        assert_eq!(store.get("k"), Some(vec![1, 2]));
    }

    #[test]
    fn generated_ids_are_distinct_and_lowercase() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 20);
        assert_ne!(a, b);
        assert_eq!(a, a.to_lowercase());
    }
}
