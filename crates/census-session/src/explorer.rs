//! The explorer context: one value owning every piece of session state.
//!
//! [`Explorer`] ties the loader, the active dataset's tables, the
//! navigation position and the filter state together. It is owned by the
//! application root and driven through `&mut self`; nothing is global.
//!
//! Filter edits are debounced. `set_selection` / `set_range` record the
//! edit and restart the [`Debouncer`]; queries evaluate the last *settled*
//! filter state, so a burst of edits causes a single evaluation once the
//! window passes. [`Explorer::flush_filters`] settles immediately.

use std::time::Duration;

use census_filter::{
    AvailableOptions, FilterKey, FilterResultCache, SelectionSynchronizer, SortState,
    active_filter_count, available_for, available_options, evaluate,
};
use census_ingest::{Fetcher, load_manifest};
use census_model::columns::{available_years, column_for_year, metric_options, previous_year};
use census_model::format::YearChange;
use census_model::{
    CellValue, DatasetHandle, FilterState, Level, Manifest, NavigationState, NumericRange,
    Preferences, RangeDimension, Row, Rows, SetDimension,
};
use census_store::{LevelLoader, LoadProgress, RowStore};
use tokio::sync::{broadcast, watch};

use crate::config::ExplorerConfig;
use crate::debounce::Debouncer;
use crate::error::{ExplorerError, Result};
use crate::events::ExplorerEvent;
use crate::preferences::PreferencesStore;

const EVENT_CAPACITY: usize = 64;

/// Upper bound on reconciliation rounds; each round can only narrow the
/// option sets of the other dimensions.
const MAX_SYNC_ROUNDS: usize = SetDimension::ALL.len() + 1;

/// Which year metric values are compared against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompareYear {
    /// The year before the selected one, when the dataset has it.
    #[default]
    Auto,
    Fixed(String),
}

/// Dataset, year, metric and compare-year choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub dataset: Option<DatasetHandle>,
    pub year: Option<String>,
    pub metric: Option<String>,
    pub compare: CompareYear,
}

/// Year-over-year comparison of the active metric for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: String,
    pub year: String,
    pub compare_year: String,
    pub current: CellValue,
    pub previous: CellValue,
    /// `None` when either value is not numeric or the previous one is zero.
    pub change: Option<YearChange>,
}

pub struct Explorer<F> {
    loader: LevelLoader<F>,
    store: RowStore,
    manifest: Option<Manifest>,
    nav: NavigationState,
    selection: Selection,
    sort: SortState,
    search: String,
    /// Latest edits, not yet necessarily applied.
    edits: FilterState,
    /// Filter state queries evaluate.
    applied: FilterState,
    applied_generation: u64,
    debouncer: Debouncer,
    synchronizer: SelectionSynchronizer,
    results: FilterResultCache,
    preferences: PreferencesStore,
    events: broadcast::Sender<ExplorerEvent>,
}

impl<F: Fetcher> Explorer<F> {
    pub fn new(fetcher: F, config: &ExplorerConfig) -> Self {
        let loader = LevelLoader::new(fetcher);
        loader.set_prefetch(config.loading.prefetch);
        Self::with_loader(loader, config.debounce(), FilterResultCache::new(config.cache_capacity()))
    }

    fn with_loader(loader: LevelLoader<F>, debounce: Duration, results: FilterResultCache) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            loader,
            store: RowStore::new(),
            manifest: None,
            nav: NavigationState::national(),
            selection: Selection::default(),
            sort: SortState::default(),
            search: String::new(),
            edits: FilterState::new(),
            applied: FilterState::new(),
            applied_generation: 0,
            debouncer: Debouncer::new(debounce),
            synchronizer: SelectionSynchronizer::new(),
            results,
            preferences: PreferencesStore::disabled(),
            events,
        }
    }

    /// Persist dataset / year / metric choices in `store`.
    pub fn with_preferences(mut self, store: PreferencesStore) -> Self {
        self.preferences = store;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn loader(&self) -> &LevelLoader<F> {
        &self.loader
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn level(&self) -> Level {
        self.nav.level()
    }

    pub fn breadcrumb(&self) -> String {
        self.nav.breadcrumb()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dataset(&self) -> Option<&DatasetHandle> {
        self.selection.dataset.as_ref()
    }

    pub fn year(&self) -> Option<&str> {
        self.selection.year.as_deref()
    }

    pub fn metric(&self) -> Option<&str> {
        self.selection.metric.as_deref()
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Filter state including edits still inside the debounce window.
    pub fn filter_edits(&self) -> &FilterState {
        &self.edits
    }

    /// Filter state the last query evaluated.
    pub fn applied_filters(&self) -> &FilterState {
        &self.applied
    }

    pub fn progress(&self) -> LoadProgress {
        self.loader.progress()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<LoadProgress> {
        self.loader.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExplorerEvent> {
        self.events.subscribe()
    }

    /// Receiver that changes every time filter edits settle.
    pub fn subscribe_settled(&self) -> watch::Receiver<u64> {
        self.debouncer.subscribe()
    }

    // =========================================================================
    // Manifest and preferences
    // =========================================================================

    /// Load the dataset catalog.
    pub async fn load_manifest(&mut self) -> Result<&Manifest> {
        let manifest = load_manifest(self.loader.fetcher())
            .await
            .map_err(|source| ExplorerError::Manifest { source })?;
        Ok(self.manifest.insert(manifest))
    }

    /// Select the dataset, year and metric saved by a previous session.
    ///
    /// Returns `Ok(false)` when nothing was saved. A saved year or metric
    /// the dataset no longer has is replaced by the defaults.
    pub async fn restore_preferences(&mut self) -> Result<bool> {
        let Some(prefs) = self.preferences.load() else {
            return Ok(false);
        };
        let Some(dataset) = prefs.dataset else {
            return Ok(false);
        };
        let prior = self.selection.clone();
        self.selection.year = prefs.year;
        self.selection.metric = prefs.metric;
        if let Err(err) = self.select_dataset(DatasetHandle::new(dataset)).await {
            self.selection = prior;
            return Err(err);
        }
        Ok(true)
    }

    fn save_preferences(&self) {
        self.preferences.save(&Preferences {
            dataset: self.selection.dataset.as_ref().map(|h| h.as_str().to_string()),
            year: self.selection.year.clone(),
            metric: self.selection.metric.clone(),
        });
    }

    // =========================================================================
    // Dataset, year and metric selection
    // =========================================================================

    /// Make `handle` the active dataset.
    ///
    /// Loads its state table, keeps the current year and metric when the
    /// dataset has them (otherwise picks the newest year and its first
    /// metric), then prefetches the county table. On any failure nothing
    /// changes: the previous dataset, year, metric and compare year stay.
    pub async fn select_dataset(&mut self, handle: DatasetHandle) -> Result<()> {
        match self.stage_dataset(&handle).await {
            Ok((rows, selection)) => {
                self.commit_dataset(&handle, rows, selection);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%handle, error = %err, "dataset selection rolled back");
                self.emit(ExplorerEvent::DatasetSelectionFailed {
                    handle,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn stage_dataset(&self, handle: &DatasetHandle) -> Result<(Rows, Selection)> {
        if let Some(manifest) = &self.manifest
            && manifest.find(handle).is_none()
        {
            return Err(ExplorerError::UnknownDataset {
                handle: handle.clone(),
            });
        }

        let rows = self.loader.load(handle, Level::State).await?;
        let columns = rows.first().map(|row| row.columns().to_vec()).unwrap_or_default();
        let years = available_years(&columns);
        let Some(newest) = years.first() else {
            return Err(ExplorerError::NoYears {
                handle: handle.clone(),
            });
        };

        let year = self
            .selection
            .year
            .clone()
            .filter(|y| years.contains(y))
            .unwrap_or_else(|| newest.clone());
        let metric = pick_metric(&columns, &year, self.selection.metric.as_deref());
        let compare = match &self.selection.compare {
            CompareYear::Fixed(y) if years.contains(y) => CompareYear::Fixed(y.clone()),
            _ => CompareYear::Auto,
        };
        let selection = Selection {
            dataset: Some(handle.clone()),
            year: Some(year),
            metric,
            compare,
        };
        Ok((rows, selection))
    }

    fn commit_dataset(&mut self, handle: &DatasetHandle, rows: Rows, selection: Selection) {
        let switched = self.selection.dataset.as_ref() != Some(handle);
        self.store.activate(handle);
        self.store.put(handle, Level::State, rows);
        self.selection = selection;
        if switched {
            self.nav = NavigationState::national();
            self.sort.clear();
            self.results.clear();
        }
        self.reset_filters();
        tracing::info!(
            %handle,
            year = self.selection.year.as_deref().unwrap_or_default(),
            metric = self.selection.metric.as_deref().unwrap_or_default(),
            "dataset selected"
        );
        self.save_preferences();
        self.loader.prefetch_next(handle, Level::State);
        self.emit(ExplorerEvent::DatasetSelected {
            handle: handle.clone(),
        });
    }

    /// Deselect the dataset, clearing year, metric and loaded tables.
    pub fn clear_dataset(&mut self) {
        self.selection = Selection {
            compare: self.selection.compare.clone(),
            ..Selection::default()
        };
        self.store = RowStore::new();
        self.nav = NavigationState::national();
        self.sort.clear();
        self.reset_filters();
        self.emit(ExplorerEvent::DatasetCleared);
    }

    /// Years offered by the active dataset, newest first.
    pub fn available_years(&self) -> Vec<String> {
        available_years(self.state_columns())
    }

    /// Metric columns offered for the selected year.
    pub fn metric_options(&self) -> Vec<census_model::columns::MetricOption> {
        match self.year() {
            Some(year) => metric_options(self.state_columns(), year),
            None => Vec::new(),
        }
    }

    pub fn select_year(&mut self, year: &str) -> Result<()> {
        self.require_dataset()?;
        if !self.available_years().iter().any(|y| y == year) {
            return Err(ExplorerError::UnknownYear {
                year: year.to_string(),
            });
        }
        let metric = pick_metric(self.state_columns(), year, self.metric());
        self.selection.year = Some(year.to_string());
        self.selection.metric = metric;
        self.save_preferences();
        Ok(())
    }

    pub fn select_metric(&mut self, metric: &str) -> Result<()> {
        self.require_dataset()?;
        let year = self.year().unwrap_or_default().to_string();
        if !self.metric_options().iter().any(|m| m.column == metric) {
            return Err(ExplorerError::UnknownMetric {
                metric: metric.to_string(),
                year,
            });
        }
        self.selection.metric = Some(metric.to_string());
        self.save_preferences();
        Ok(())
    }

    /// Compare against `year`, or `None` to go back to the automatic choice.
    pub fn set_compare_year(&mut self, year: Option<&str>) -> Result<()> {
        match year {
            None => self.selection.compare = CompareYear::Auto,
            Some(year) => {
                if !self.available_years().iter().any(|y| y == year) {
                    return Err(ExplorerError::UnknownYear {
                        year: year.to_string(),
                    });
                }
                self.selection.compare = CompareYear::Fixed(year.to_string());
            }
        }
        Ok(())
    }

    /// The resolved compare year.
    pub fn compare_year(&self) -> Option<String> {
        match &self.selection.compare {
            CompareYear::Fixed(year) => Some(year.clone()),
            CompareYear::Auto => {
                let year = self.year()?;
                previous_year(year, &self.available_years())
            }
        }
    }

    /// Compare the active metric of `row` with its compare-year value.
    pub fn comparison(&self, row: &Row) -> Option<Comparison> {
        let metric = self.metric()?;
        let year = self.year()?;
        let compare_year = self.compare_year()?;
        let previous_column = column_for_year(metric, &compare_year)?;
        let current = row.get(metric).cloned().unwrap_or_default();
        let previous = row.get(&previous_column).cloned().unwrap_or_default();
        Some(Comparison {
            metric: metric.to_string(),
            year: year.to_string(),
            compare_year,
            change: YearChange::between(&current, &previous),
            current,
            previous,
        })
    }

    fn state_columns(&self) -> &[String] {
        self.store
            .table(Level::State)
            .and_then(|rows| rows.first())
            .map(Row::columns)
            .unwrap_or_default()
    }

    fn require_dataset(&self) -> Result<DatasetHandle> {
        self.selection.dataset.clone().ok_or(ExplorerError::NoDataset)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// `state → county`: show the counties of `state`.
    pub async fn drill_to_state(&mut self, state: &str) -> Result<()> {
        let next = self.nav.drill_to_state(state)?;
        self.transition(next).await
    }

    /// `county → zcta5`: show the ZIP codes of `county` in the current state.
    pub async fn drill_to_county(&mut self, county: &str) -> Result<()> {
        let next = self.nav.drill_to_county(county)?;
        self.transition(next).await
    }

    /// One level wider. Returns false at the national view, where only the
    /// sort is cleared.
    pub fn go_back(&mut self) -> bool {
        self.sort.clear();
        let Some(previous) = self.nav.back() else {
            return false;
        };
        self.emit(ExplorerEvent::TransitionStarted {
            from: self.nav.level(),
            to: previous.level(),
        });
        self.nav = previous;
        self.reset_filters();
        self.finish_transition();
        true
    }

    /// Back to the national view with sort and filters reset.
    pub fn reset(&mut self) {
        let from = self.nav.level();
        self.emit(ExplorerEvent::TransitionStarted {
            from,
            to: Level::State,
        });
        self.nav = NavigationState::national();
        self.sort.clear();
        self.reset_filters();
        self.finish_transition();
    }

    /// Load the target level if needed, then move there.
    ///
    /// The position only changes once the level's table is available; a
    /// failed load leaves the explorer where it was.
    async fn transition(&mut self, next: NavigationState) -> Result<()> {
        let handle = self.require_dataset()?;
        let level = next.level();
        self.emit(ExplorerEvent::TransitionStarted {
            from: self.nav.level(),
            to: level,
        });

        if let Err(err) = self.ensure_level(&handle, level).await {
            self.finish_transition();
            return Err(err);
        }

        self.nav = next;
        self.sort.clear();
        self.reset_filters();
        self.loader.prefetch_next(&handle, level);
        tracing::debug!(level = %level, breadcrumb = %self.nav.breadcrumb(), "navigated");
        self.finish_transition();
        Ok(())
    }

    async fn ensure_level(&mut self, handle: &DatasetHandle, level: Level) -> Result<()> {
        if self.store.has(level) {
            return Ok(());
        }
        let rows = self.loader.load(handle, level).await?;
        self.store.put(handle, level, rows);
        Ok(())
    }

    fn finish_transition(&self) {
        self.emit(ExplorerEvent::TransitionFinished {
            level: self.nav.level(),
            breadcrumb: self.nav.breadcrumb(),
        });
    }

    // =========================================================================
    // Filters, search and sort
    // =========================================================================

    pub fn set_selection(&mut self, dimension: SetDimension, values: Vec<String>) {
        self.edits.set_selection(dimension, values);
        self.debouncer.trigger();
    }

    pub fn set_range(&mut self, dimension: RangeDimension, range: NumericRange) {
        self.edits.set_range(dimension, range);
        self.debouncer.trigger();
    }

    pub fn clear_ranges(&mut self) {
        self.edits.clear_ranges();
        self.debouncer.trigger();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Apply pending edits now instead of waiting for the debounce window.
    pub fn flush_filters(&mut self) {
        if self.debouncer.is_pending() {
            self.debouncer.fire_now();
        }
        self.apply_settled();
    }

    /// Select every available option of every dimension and clear ranges.
    pub fn reset_filters(&mut self) {
        self.debouncer.cancel();
        let mut filters = FilterState::new();
        match self.store.scoped(&self.nav) {
            Some(scoped) => {
                let options = available_options(
                    self.nav.level(),
                    &scoped,
                    &FilterState::new(),
                    self.selection.metric.as_deref(),
                );
                self.synchronizer.select_all(&options, &mut filters);
            }
            None => self.synchronizer.reset(),
        }
        self.edits = filters.clone();
        self.applied = filters;
        self.applied_generation = self.debouncer.generation();
        self.emit(ExplorerEvent::FiltersReset {
            level: self.nav.level(),
        });
    }

    /// Header click: sort by `column`, flipping direction on repeat clicks.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
    }

    /// Rows of the current scope after the settled filters, search and sort.
    ///
    /// `None` while the current level's table is not loaded.
    pub fn filtered_rows(&mut self) -> Option<Rows> {
        self.apply_settled();
        let scoped = self.store.scoped(&self.nav)?;
        let dataset = self.selection.dataset.as_ref()?;
        let level = self.nav.level();
        let metric = self.selection.metric.as_deref();
        let key = FilterKey {
            dataset,
            level,
            state: self.nav.current_state(),
            county: self.nav.current_county(),
            filters: &self.applied,
            search: &self.search,
            metric,
        };
        let filtered = self.results.get_or_compute(&key, || {
            evaluate(level, &scoped, &self.applied, &self.search, metric)
        });
        Some(self.sort.apply(&filtered))
    }

    /// Options each multi-select offers under the settled filters.
    pub fn available_options(&mut self) -> AvailableOptions {
        self.apply_settled();
        self.current_options()
    }

    /// Number of restricting dimensions plus present range bounds.
    pub fn active_filter_count(&mut self) -> usize {
        let options = self.available_options();
        active_filter_count(&self.applied, &options)
    }

    pub fn has_active_filters(&mut self) -> bool {
        self.active_filter_count() > 0
    }

    fn current_options(&self) -> AvailableOptions {
        match self.store.scoped(&self.nav) {
            Some(scoped) => available_options(
                self.nav.level(),
                &scoped,
                &self.applied,
                self.selection.metric.as_deref(),
            ),
            None => AvailableOptions::default(),
        }
    }

    /// Adopt the edits once the debouncer has fired since the last query.
    fn apply_settled(&mut self) {
        let generation = self.debouncer.generation();
        if generation == self.applied_generation {
            return;
        }
        self.applied_generation = generation;
        self.applied = self.edits.clone();
        self.synchronize();
        tracing::debug!(generation, "filter edits applied");
    }

    /// Reconcile selections until the option sets stop changing.
    ///
    /// Options are recomputed after every changed dimension so the next
    /// dimension sees the narrowed selection.
    fn synchronize(&mut self) {
        let Some(scoped) = self.store.scoped(&self.nav) else {
            return;
        };
        let level = self.nav.level();
        let metric = self.selection.metric.as_deref();
        for _ in 0..MAX_SYNC_ROUNDS {
            let mut changed = false;
            for dimension in SetDimension::for_level(level) {
                let available = available_for(dimension, level, &scoped, &self.applied, metric);
                if self
                    .synchronizer
                    .sync_dimension(dimension, &available, &mut self.applied)
                {
                    self.edits
                        .set_selection(dimension, self.applied.selection(dimension).to_vec());
                    changed = true;
                }
            }
            if !changed {
                return;
            }
        }
        tracing::warn!(%level, "filter selections did not settle");
    }

    fn emit(&self, event: ExplorerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Keep `current` when `year` has it, otherwise the first metric of `year`.
fn pick_metric<S: AsRef<str>>(columns: &[S], year: &str, current: Option<&str>) -> Option<String> {
    let options = metric_options(columns, year);
    current
        .filter(|m| options.iter().any(|o| o.column == *m))
        .map(str::to_string)
        .or_else(|| options.into_iter().next().map(|o| o.column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_metric_keeps_available_choice() {
        let columns = ["state_name", "median_income_2023", "total_population_2023"];
        assert_eq!(
            pick_metric(&columns, "2023", Some("total_population_2023")).as_deref(),
            Some("total_population_2023")
        );
        assert_eq!(
            pick_metric(&columns, "2023", Some("median_income_2022")).as_deref(),
            Some("median_income_2023")
        );
        assert_eq!(pick_metric(&columns, "2021", None), None);
    }
}
