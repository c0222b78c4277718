//! Key-value ledger seam
//!
//! The ledger of record is external: it only offers `get` and `put` of
//! opaque bytes, and it owns ordering and commit. Implementations:
//!
//! - [`MemoryStateStore`]: in-process map, for tests and local runs
//! - [`RocksStateStore`](crate::RocksStateStore): durable RocksDB backend

use crate::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// External key-value ledger
pub trait StateStore: Send + Sync {
    /// Read the value under `key`, `None` if absent
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`
    fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-memory ledger
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStateStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if no key is set
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Raw bytes under `key`
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    /// Seed raw bytes, bypassing any encoding
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.write().insert(key.into(), value.into());
    }
}

impl StateStore for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
