//! Memo of recent filter evaluations.

use std::num::NonZeroUsize;

use census_model::{DatasetHandle, FilterState, Level, Rows};
use lru::LruCache;
use serde::Serialize;

/// Default number of remembered evaluations.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(10).expect("non-zero capacity");

/// Every input an evaluation depends on.
///
/// The key is serialized to JSON, so two keys are equal exactly when their
/// effective contents are.
#[derive(Debug, Clone, Serialize)]
pub struct FilterKey<'a> {
    pub dataset: &'a DatasetHandle,
    pub level: Level,
    pub state: Option<&'a str>,
    pub county: Option<&'a str>,
    pub filters: &'a FilterState,
    pub search: &'a str,
    pub metric: Option<&'a str>,
}

impl FilterKey<'_> {
    fn encode(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(error = %e, "filter key not serializable, bypassing cache");
                None
            }
        }
    }
}

/// LRU memo of filtered row sets.
#[derive(Debug)]
pub struct FilterResultCache {
    entries: LruCache<String, Rows>,
    hits: u64,
    misses: u64,
}

impl Default for FilterResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FilterResultCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached result for `key`, or `compute` it and remember the result.
    pub fn get_or_compute(&mut self, key: &FilterKey<'_>, compute: impl FnOnce() -> Rows) -> Rows {
        let Some(encoded) = key.encode() else {
            return compute();
        };
        if let Some(rows) = self.entries.get(&encoded) {
            self.hits += 1;
            tracing::trace!(level = %key.level, rows = rows.len(), "filter cache hit");
            return Rows::clone(rows);
        }
        self.misses += 1;
        let rows = compute();
        self.entries.put(encoded, Rows::clone(&rows));
        rows
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
