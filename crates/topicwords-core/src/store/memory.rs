use super::{KeyValueStore, StoreError};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory store backed by a `BTreeMap`.
///
/// Keys listed through [`MemoryStore::fail_writes_to`] reject every `set` and
/// `remove`, which lets tests exercise the manager's rollback path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    failing: BTreeSet<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with raw values.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            failing: BTreeSet::new(),
        }
    }

    /// Make every subsequent write to `key` fail.
    pub fn fail_writes_to(&mut self, key: &str) {
        self.failing.insert(key.to_string());
    }

    /// Restore normal writes to `key`.
    pub fn heal(&mut self, key: &str) {
        self.failing.remove(key);
    }

    /// Raw value currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.contains(key) {
            return Err(StoreError::Rejected(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.failing.contains(key) {
            return Err(StoreError::Rejected(key.to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").expect("get"), None);
    }

    #[test]
    fn set_then_remove() {
        let mut store = MemoryStore::new();
        store.set("k", "v").expect("set");
        assert_eq!(store.raw("k"), Some("v"));
        store.remove("k").expect("remove");
        assert!(store.is_empty());
        store.remove("k").expect("removing twice is fine");
    }

    #[test]
    fn failing_key_rejects_writes_until_healed() {
        let mut store = MemoryStore::with_entries([("k", "old")]);
        store.fail_writes_to("k");
        assert!(matches!(store.set("k", "new"), Err(StoreError::Rejected(_))));
        assert!(store.remove("k").is_err());
        assert_eq!(store.raw("k"), Some("old"));

        store.heal("k");
        store.set("k", "new").expect("healed write");
        assert_eq!(store.raw("k"), Some("new"));
    }
}
