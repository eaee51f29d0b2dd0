//! Concurrent session storage.
//!
//! Sharded map used by `SessionRegistry` to hold one session per client.

use crate::application::ports::Storage;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Thread-safe sharded storage backed by DashMap.
///
/// Each client's entry is locked only for the duration of one pipeline run,
/// so clients on different shards never wait on each other.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, V>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Create an empty storage sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity(capacity),
        }
    }

    /// Check if a key exists.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove a key and return its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key)
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut value_ref = self.map.entry(key).or_insert_with(factory);
        accessor(&mut value_ref)
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        self.map.get_mut(key).map(|mut value_ref| accessor(&mut value_ref))
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

// Shared handle, so a registry can be cloned cheaply
impl<K, V> Storage<K, V> for Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_existing_mut(key, accessor)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        (**self).retain(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_created_once() {
        let storage: ShardedStorage<&str, u32> = ShardedStorage::new();

        storage.with_entry_mut("alice", || 0, |v| *v += 1);
        storage.with_entry_mut("alice", || 100, |v| *v += 1);

        let value = storage.with_entry_mut("alice", || 0, |v| *v);
        assert_eq!(value, 2);
        assert_eq!(storage.len(), 1);
        assert!(storage.contains_key("alice"));
    }

    #[test]
    fn test_existing_entry_not_created() {
        let storage: ShardedStorage<&str, u32> = ShardedStorage::new();

        assert_eq!(storage.with_existing_mut(&"bob", |v| *v), None);
        assert!(storage.is_empty());

        storage.with_entry_mut("bob", || 7, |_| ());
        assert_eq!(storage.with_existing_mut(&"bob", |v| *v), Some(7));
    }

    #[test]
    fn test_retain_and_remove() {
        let storage: ShardedStorage<String, u32> = ShardedStorage::with_capacity(4);
        for i in 0..4 {
            storage.with_entry_mut(format!("client-{}", i), || i, |_| ());
        }

        storage.retain(|_, v| *v % 2 == 0);
        assert_eq!(storage.len(), 2);

        assert_eq!(storage.remove("client-0"), Some(("client-0".to_string(), 0)));
        assert!(!storage.contains_key("client-0"));
    }

    #[test]
    fn test_clear() {
        let storage: ShardedStorage<u32, u32> = ShardedStorage::new();
        storage.with_entry_mut(1, || 1, |_| ());
        assert!(!storage.is_empty());

        storage.clear();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let storage: Arc<ShardedStorage<String, u32>> = Arc::new(ShardedStorage::new());
        let mut handles = vec![];

        for i in 0..10 {
            let storage = Arc::clone(&storage);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    storage.with_entry_mut(format!("key_{}_{}", i, j), || 0, |v| *v += 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(Storage::len(&storage), 1000);
    }
}
