//! Fetch-and-parse orchestration for `(dataset, level)` tables.
//!
//! A load consults the [`DatasetCache`] first. On a miss it takes the
//! per-key in-flight lock, checks the cache again (a concurrent load may
//! have finished meanwhile), then fetches the resource and parses it on
//! the blocking pool so large tables never stall the async runtime.
//!
//! Progress is published on a `watch` channel for the focused key only:
//! the most recent [`LevelLoader::load`] call. Background prefetches update
//! it only when they happen to serve the focused key.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use census_ingest::{Fetcher, ensure_payload, parse_rows_with_progress};
use census_model::{DatasetHandle, Level, Rows};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::cache::{CacheKey, DatasetCache};
use crate::error::{LoadError, Result};
use crate::progress::{LoadProgress, LoadStage};

/// Loads per-level tables through a shared cache.
///
/// Cloning is cheap; clones share cache, in-flight locks and progress.
pub struct LevelLoader<F> {
    inner: Arc<Inner<F>>,
}

struct Inner<F> {
    fetcher: F,
    cache: DatasetCache,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
    progress: watch::Sender<LoadProgress>,
    prefetch: AtomicBool,
}

impl<F> Clone for LevelLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetcher> LevelLoader<F> {
    pub fn new(fetcher: F) -> Self {
        let (progress, _) = watch::channel(LoadProgress::default());
        Self {
            inner: Arc::new(Inner {
                fetcher,
                cache: DatasetCache::new(),
                in_flight: Mutex::new(HashMap::new()),
                progress,
                prefetch: AtomicBool::new(true),
            }),
        }
    }

    /// Enable or disable speculative next-level loads.
    pub fn set_prefetch(&self, enabled: bool) {
        self.inner.prefetch.store(enabled, Ordering::Relaxed);
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.inner.cache
    }

    pub fn cached(&self, handle: &DatasetHandle, level: Level) -> Option<Rows> {
        self.inner.cache.get(handle, level)
    }

    /// Receiver of progress updates for the focused load.
    pub fn subscribe(&self) -> watch::Receiver<LoadProgress> {
        self.inner.progress.subscribe()
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> LoadProgress {
        self.inner.progress.borrow().clone()
    }

    /// Load the table the user is waiting for, moving progress focus to it.
    pub async fn load(&self, handle: &DatasetHandle, level: Level) -> Result<Rows> {
        self.load_with(handle, level, true).await
    }

    /// Start loading `(handle, level)` in the background.
    ///
    /// Failures are logged and swallowed. Returns `None` when prefetching is
    /// disabled or the table is already cached.
    pub fn prefetch(&self, handle: &DatasetHandle, level: Level) -> Option<JoinHandle<()>> {
        if !self.inner.prefetch.load(Ordering::Relaxed) || self.inner.cache.contains(handle, level)
        {
            return None;
        }
        tracing::debug!(%handle, %level, "prefetching table");
        let loader = self.clone();
        let handle = handle.clone();
        Some(tokio::spawn(async move {
            if let Err(err) = loader.load_with(&handle, level, false).await {
                tracing::warn!(%handle, %level, error = %err, "prefetch failed");
            }
        }))
    }

    /// Prefetch the level below `level`, if any.
    pub fn prefetch_next(&self, handle: &DatasetHandle, level: Level) -> Option<JoinHandle<()>> {
        level.child().and_then(|child| self.prefetch(handle, child))
    }

    async fn load_with(&self, handle: &DatasetHandle, level: Level, focused: bool) -> Result<Rows> {
        if let Some(rows) = self.inner.cache.get(handle, level) {
            tracing::debug!(%handle, %level, rows = rows.len(), "table cache hit");
            if focused {
                self.focus_finished(handle, level, rows.len());
            }
            return Ok(rows);
        }
        if focused {
            self.inner
                .progress
                .send_replace(LoadProgress::started(handle, level));
        }

        let key_lock = {
            let mut in_flight = self.inner.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry((handle.clone(), level))
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = key_lock.lock().await;

        if let Some(rows) = self.inner.cache.get(handle, level) {
            tracing::debug!(%handle, %level, "table loaded by concurrent request");
            self.update(handle, level, |p| p.finish(rows.len()));
            return Ok(rows);
        }

        let started = Instant::now();
        match self.fetch_and_parse(handle, level).await {
            Ok(rows) => {
                let rows = self.inner.cache.put(handle, level, rows);
                tracing::info!(
                    %handle,
                    %level,
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "loaded table"
                );
                self.update(handle, level, |p| p.finish(rows.len()));
                Ok(rows)
            }
            Err(err) => {
                if focused {
                    tracing::error!(%handle, %level, reason = ?err.reason(), error = %err, "load failed");
                }
                self.update(handle, level, |p| p.stage = LoadStage::Failed);
                Err(err)
            }
        }
    }

    async fn fetch_and_parse(&self, handle: &DatasetHandle, level: Level) -> Result<Rows> {
        let path = handle.resource_path(level);
        self.update(handle, level, |p| p.stage = LoadStage::Downloading);
        let text = self
            .inner
            .fetcher
            .fetch_text(&path)
            .await
            .and_then(|text| ensure_payload(&path, text))
            .map_err(|e| LoadError::ingest(handle, level, e))?;

        self.update(handle, level, |p| p.stage = LoadStage::Processing);
        let loader = self.clone();
        let progress_handle = handle.clone();
        let parsed = tokio::task::spawn_blocking(move || {
            parse_rows_with_progress(&text, |parse| {
                loader.update(&progress_handle, level, |p| p.apply_parse(parse));
            })
        })
        .await;

        match parsed {
            Ok(Ok(rows)) => Ok(Rows::from(rows)),
            Ok(Err(e)) => Err(LoadError::ingest(handle, level, e)),
            Err(e) => Err(LoadError::Interrupted {
                handle: handle.clone(),
                level,
                message: e.to_string(),
            }),
        }
    }
}

impl<F> LevelLoader<F> {
    /// Apply `change` to the progress snapshot if it belongs to the key.
    fn update(&self, handle: &DatasetHandle, level: Level, change: impl FnOnce(&mut LoadProgress)) {
        self.inner.progress.send_if_modified(|progress| {
            if progress.is_for(handle, level) {
                change(progress);
                true
            } else {
                false
            }
        });
    }

    fn focus_finished(&self, handle: &DatasetHandle, level: Level, rows: usize) {
        let mut progress = LoadProgress::started(handle, level);
        progress.finish(rows);
        self.inner.progress.send_replace(progress);
    }
}

#[cfg(test)]
mod tests {
    use census_ingest::MemoryFetcher;

    use super::*;
    use crate::error::LoadFailure;

    const STATE_CSV: &str = "state_name,census_region\nTexas,3\nMaine,1\n";

    fn loader() -> LevelLoader<MemoryFetcher> {
        LevelLoader::new(
            MemoryFetcher::new()
                .with_resource("data/census2024_state.csv", STATE_CSV)
                .with_resource("data/census2024_county.csv", "")
                .with_resource("data/census2024_zcta5.csv", "zcta5\n"),
        )
    }

    #[tokio::test]
    async fn test_load_reports_terminal_progress() {
        let loader = loader();
        let handle = DatasetHandle::new("census2024");
        let rows = loader.load(&handle, Level::State).await.unwrap();
        assert_eq!(rows.len(), 2);
        let progress = loader.progress();
        assert_eq!(progress.stage, LoadStage::Loaded);
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.message(), "States loaded");
    }

    #[tokio::test]
    async fn test_failure_reasons() {
        let loader = loader();
        let handle = DatasetHandle::new("census2024");
        let empty = loader.load(&handle, Level::County).await.unwrap_err();
        assert_eq!(empty.reason(), LoadFailure::EmptyPayload);
        assert_eq!(loader.progress().message(), "Failed to load Counties");

        let no_rows = loader.load(&handle, Level::Zcta5).await.unwrap_err();
        assert_eq!(no_rows.reason(), LoadFailure::NoData);

        let missing = loader
            .load(&DatasetHandle::new("nope"), Level::State)
            .await
            .unwrap_err();
        assert_eq!(missing.reason(), LoadFailure::NotFound);
        assert!(loader.cache().is_empty());
    }
}
