use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::StoreError;

use super::SettingsStore;

/// Volatile store used by tests and by callers that do not want anything
/// written to disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let store = MemoryStore::new();
        store.set("currency", "$").unwrap();
        store.set("currency", "€").unwrap();
        assert_eq!(store.get("currency").as_deref(), Some("€"));
        assert_eq!(store.len(), 1);

        store.remove("currency").unwrap();
        assert_eq!(store.get("currency"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn removing_missing_key_is_fine() {
        let store = MemoryStore::with_entries([("theme", "dark")]);
        store.remove("bgColor").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}
