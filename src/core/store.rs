//! In-memory key/value store
//!
//! This module provides `MemStore`, an ordered in-memory implementation of
//! [`KvStore`]. It backs the replay host and the tests; a consensus host
//! plugs in its own persistent store instead.

use crate::core::traits::KvStore;
use std::collections::BTreeMap;

/// Ordered in-memory store
///
/// Keys iterate in byte order, so two stores fed the same transactions
/// compare equal and dump identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Create a new empty store
    pub fn new() -> Self {
        MemStore {
            entries: BTreeMap::new(),
        }
    }

    /// Number of keys with a stored value
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Vec<u8> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(key.to_vec(), value);
    }
}
