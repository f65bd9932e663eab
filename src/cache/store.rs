//! Storage medium abstraction.
//!
//! The prediction cache only ever talks to a flat, string-keyed,
//! string-valued medium that can be enumerated by index. Everything above
//! this trait (namespacing, expiry, eviction) is built from those five
//! primitives.

// Author: kelexine (https://github.com/kelexine)

use crate::error::{CacheError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Synchronous key-value medium shared by every cache instance in a process.
///
/// Implementations provide their own interior mutability; all methods take
/// `&self` and complete before returning.
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// A failed write must leave the previous value (or absence) intact.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Key at position `index` in the medium's enumeration order.
    fn key_at(&self, index: usize) -> Result<Option<String>>;

    /// Total number of keys in the medium, across all namespaces.
    fn count(&self) -> Result<usize>;
}

// Lets several caches (or a cache and its caller) share one medium
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn key_at(&self, index: usize) -> Result<Option<String>> {
        (**self).key_at(index)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }
}

/// Snapshot every key in the medium that starts with `prefix`.
///
/// The medium has no prefix query, so this is a linear scan. Keys are
/// collected before the caller mutates anything so that deletions do not
/// shift the enumeration underneath us.
pub fn namespace_keys(store: &dyn CacheStore, prefix: &str) -> Result<Vec<String>> {
    let total = store.count()?;
    let mut keys = Vec::new();
    for index in 0..total {
        if let Some(key) = store.key_at(index)? {
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

#[derive(Debug, Default)]
struct MemoryInner {
    /// Insertion-ordered entries
    entries: Vec<(String, String)>,
    /// Sum of key and value lengths
    bytes: usize,
}

impl MemoryInner {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// In-process medium with insertion-ordered enumeration and an optional quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.inner.read().bytes
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read();
        Ok(inner
            .position(key)
            .map(|i| inner.entries[i].1.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let existing = inner.position(key);
        let freed = existing
            .map(|i| inner.entries[i].0.len() + inner.entries[i].1.len())
            .unwrap_or(0);
        let needed = inner.bytes - freed + key.len() + value.len();

        if let Some(quota) = self.quota_bytes {
            if needed > quota {
                return Err(CacheError::QuotaExceeded { needed, quota });
            }
        }

        match existing {
            Some(i) => inner.entries[i].1 = value.to_string(),
            None => inner.entries.push((key.to_string(), value.to_string())),
        }
        inner.bytes = needed;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(i) = inner.position(key) {
            let (k, v) = inner.entries.remove(i);
            inner.bytes -= k.len() + v.len();
        }
        Ok(())
    }

    fn key_at(&self, index: usize) -> Result<Option<String>> {
        Ok(self.inner.read().entries.get(index).map(|(k, _)| k.clone()))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.inner.read().entries.len())
    }
}
