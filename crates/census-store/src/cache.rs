//! Process-wide memo of loaded tables.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use census_model::{DatasetHandle, Level, Rows};

/// Key of one cached table.
pub type CacheKey = (DatasetHandle, Level);

/// Loaded tables keyed by `(dataset, level)`.
///
/// Entries are complete, immutable and never evicted. A second `put` for
/// the same key keeps the first table.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<CacheKey, Rows>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &DatasetHandle, level: Level) -> Option<Rows> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&(handle.clone(), level)).cloned()
    }

    /// Store `rows` unless the key is already present; returns the cached
    /// table either way.
    pub fn put(&self, handle: &DatasetHandle, level: Level, rows: Rows) -> Rows {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry((handle.clone(), level))
            .or_insert(rows)
            .clone()
    }

    pub fn contains(&self, handle: &DatasetHandle, level: Level) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&(handle.clone(), level))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every table. Only used for a full reset.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
