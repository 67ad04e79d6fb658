//! Persisted autoplay preferences
//!
//! The controller never touches browser storage directly. It goes through
//! [`PreferenceStore`], so hosts can back it with `localStorage`, a file, or
//! memory.

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Value written for a set flag
pub const FLAG_SET: &str = "1";

/// Key-value store for autoplay flags
///
/// Keys are scoped to the site; values survive page navigations until
/// cleared.
pub trait PreferenceStore {
    /// Read a value, `Ok(None)` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value (absent keys are not an error)
    fn clear(&mut self, key: &str) -> Result<()>;

    /// Whether `key` holds the set flag
    fn is_flag_set(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some(FLAG_SET))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    operations: usize,
}

/// In-memory preference store
///
/// Clones share the same entries, so a host can keep a handle while the
/// controller owns another (a stand-in for storage that outlives a page).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().entries.extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// Read a value without counting it as an operation
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Number of get/set/clear calls made through [`PreferenceStore`]
    pub fn operations(&self) -> usize {
        self.inner.borrow().operations
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.borrow_mut();
        inner.operations += 1;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.operations += 1;
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.operations += 1;
        inner.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let handle = MemoryStore::new();
        let mut owned = handle.clone();

        owned.set("autoPlayAllowed", FLAG_SET).unwrap();
        assert_eq!(handle.peek("autoPlayAllowed").as_deref(), Some("1"));
        assert_eq!(handle.operations(), 1);

        owned.clear("autoPlayAllowed").unwrap();
        assert!(handle.is_empty());
    }

    #[test]
    fn flag_requires_exact_value() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "true"), ("c", "")]);
        assert!(store.is_flag_set("a").unwrap());
        assert!(!store.is_flag_set("b").unwrap());
        assert!(!store.is_flag_set("c").unwrap());
        assert!(!store.is_flag_set("missing").unwrap());
    }

    #[test]
    fn clearing_absent_key_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.clear("nothing").is_ok());
        assert_eq!(store.len(), 0);
    }
}
