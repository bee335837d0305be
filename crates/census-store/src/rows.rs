//! Per-level tables of the active dataset.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use census_model::{DatasetHandle, Level, NavigationState, Row, Rows};

const STATE_COLUMN: &str = "state_name";
const COUNTY_COLUMN: &str = "county_name";

/// Tables of the active dataset, one per level.
///
/// Tables of any other dataset are rejected, so a load that finishes after
/// the user switched datasets only lands in the [`DatasetCache`].
///
/// Scoped row sets are memoized per navigation position until the tables
/// change.
///
/// [`DatasetCache`]: crate::DatasetCache
#[derive(Debug, Default)]
pub struct RowStore {
    dataset: Option<DatasetHandle>,
    tables: HashMap<Level, Rows>,
    scopes: RwLock<HashMap<NavigationState, Rows>>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> Option<&DatasetHandle> {
        self.dataset.as_ref()
    }

    /// Make `handle` the active dataset, dropping the tables of the
    /// previous one. No-op when `handle` is already active.
    pub fn activate(&mut self, handle: &DatasetHandle) {
        if self.dataset.as_ref() != Some(handle) {
            self.dataset = Some(handle.clone());
            self.tables.clear();
            self.forget_scopes(|_| true);
        }
    }

    /// Store a table of the active dataset; first write wins.
    ///
    /// Returns false when `handle` is not the active dataset.
    pub fn put(&mut self, handle: &DatasetHandle, level: Level, rows: Rows) -> bool {
        if self.dataset.as_ref() != Some(handle) {
            tracing::debug!(%handle, %level, "ignoring table of inactive dataset");
            return false;
        }
        if !self.tables.contains_key(&level) {
            self.tables.insert(level, rows);
            self.forget_scopes(|nav| nav.level() == level);
        }
        true
    }

    pub fn get(&self, handle: &DatasetHandle, level: Level) -> Option<&Rows> {
        if self.dataset.as_ref() != Some(handle) {
            return None;
        }
        self.tables.get(&level)
    }

    /// Table of `level` for the active dataset.
    pub fn table(&self, level: Level) -> Option<&Rows> {
        self.tables.get(&level)
    }

    pub fn has(&self, level: Level) -> bool {
        self.tables.contains_key(&level)
    }

    /// Rows of the current navigation scope.
    ///
    /// County rows are restricted to the selected state, ZCTA rows to the
    /// selected state and county. `None` while the level is not loaded.
    /// Repeated calls for the same position share one row set.
    pub fn scoped(&self, nav: &NavigationState) -> Option<Rows> {
        let table = self.tables.get(&nav.level())?;
        let memo = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(rows) = memo.get(nav) {
            return Some(rows.clone());
        }
        drop(memo);

        let rows = match (nav.level(), nav.current_state(), nav.current_county()) {
            (Level::State, _, _) => return Some(table.clone()),
            (Level::County, Some(state), _) => restrict(table, |row| {
                row.text_eq(STATE_COLUMN, state)
            }),
            (Level::Zcta5, Some(state), Some(county)) => restrict(table, |row| {
                row.text_eq(STATE_COLUMN, state) && row.text_eq(COUNTY_COLUMN, county)
            }),
            _ => Rows::from(Vec::new()),
        };
        tracing::trace!(level = %nav.level(), rows = rows.len(), "scoped rows");
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(nav.clone(), rows.clone());
        Some(rows)
    }

    pub fn clear(&mut self) {
        self.dataset = None;
        self.tables.clear();
        self.forget_scopes(|_| true);
    }

    fn forget_scopes(&mut self, stale: impl Fn(&NavigationState) -> bool) {
        self.scopes
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|nav, _| !stale(nav));
    }
}

fn restrict(table: &[Row], keep: impl Fn(&Row) -> bool) -> Rows {
    table.iter().filter(|row| keep(row)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn counties() -> Rows {
        Arc::from(vec![
            Row::from_pairs([("state_name", "Texas"), ("county_name", "Travis County")]),
            Row::from_pairs([("state_name", "Maine"), ("county_name", "York County")]),
            Row::from_pairs([("state_name", "Texas"), ("county_name", "Harris County")]),
        ])
    }

    #[test]
    fn test_put_rejects_inactive_dataset() {
        let mut store = RowStore::new();
        let active = DatasetHandle::new("census2024");
        store.activate(&active);
        assert!(!store.put(&DatasetHandle::new("other"), Level::County, counties()));
        assert!(store.put(&active, Level::County, counties()));
        assert!(store.has(Level::County));
        assert!(store.get(&DatasetHandle::new("other"), Level::County).is_none());
    }

    #[test]
    fn test_scope_restricts_by_navigation() {
        let mut store = RowStore::new();
        let handle = DatasetHandle::new("census2024");
        store.activate(&handle);
        store.put(&handle, Level::County, counties());

        let scoped = store.scoped(&NavigationState::in_state("Texas")).unwrap();
        let names: Vec<_> = scoped
            .iter()
            .map(|r| r.text("county_name").unwrap().into_owned())
            .collect();
        assert_eq!(names, vec!["Travis County", "Harris County"]);

        assert!(store.scoped(&NavigationState::national()).is_none());
    }

    #[test]
    fn test_repeated_scope_shares_rows() {
        let mut store = RowStore::new();
        let handle = DatasetHandle::new("census2024");
        store.activate(&handle);
        let zctas: Rows = Arc::from(vec![
            Row::from_pairs([
                ("state_name", "Texas"),
                ("county_name", "Travis County"),
                ("zcta5", "78701"),
            ]),
            Row::from_pairs([
                ("state_name", "Texas"),
                ("county_name", "Harris County"),
                ("zcta5", "77002"),
            ]),
        ]);
        store.put(&handle, Level::Zcta5, zctas);

        let nav = NavigationState::in_county("Texas", "Travis County");
        let first = store.scoped(&nav).unwrap();
        let second = store.scoped(&nav).unwrap();
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        store.activate(&DatasetHandle::new("acs"));
        store.activate(&handle);
        assert!(store.scoped(&nav).is_none());
    }

    #[test]
    fn test_activate_other_dataset_drops_tables() {
        let mut store = RowStore::new();
        let handle = DatasetHandle::new("census2024");
        store.activate(&handle);
        store.put(&handle, Level::County, counties());
        store.activate(&handle);
        assert!(store.has(Level::County));
        store.activate(&DatasetHandle::new("acs"));
        assert!(!store.has(Level::County));
    }
}
