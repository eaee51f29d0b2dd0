//! In-memory session storage.

use crate::application::ports::SessionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session-scoped key-value store kept in memory.
///
/// Clones share the same map, like tabs sharing one browser session.
/// Everything is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a HashMap half-written
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("_csrf"), None);

        store.set("_csrf", "token".to_string());
        assert_eq!(store.get("_csrf"), Some("token".to_string()));

        store.remove("_csrf");
        assert_eq!(store.get("_csrf"), None);
    }

    #[test]
    fn test_clones_share_values() {
        let store = MemorySessionStore::new();
        let other = store.clone();

        store.set("k", "v".to_string());
        assert_eq!(other.get("k"), Some("v".to_string()));
    }
}
