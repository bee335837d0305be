//! Keeping multi-select selections consistent with their options.
//!
//! [`reconcile`] decides what a single selection becomes when its option
//! set changes:
//!
//! - no options: the selection is cleared
//! - empty selection: every option is selected
//! - selection still entirely valid (all options, or a strict subset):
//!   left alone, so a deliberately narrowed selection is never widened
//! - otherwise the surviving values are kept, or every option is selected
//!   when none survive

use std::collections::{BTreeMap, HashSet};

use census_model::{FilterState, SetDimension};

use crate::options::AvailableOptions;

/// New selection for `selected` against `available`, `None` when it stays.
pub fn reconcile(available: &[String], selected: &[String]) -> Option<Vec<String>> {
    if available.is_empty() {
        return (!selected.is_empty()).then(Vec::new);
    }
    if selected.is_empty() {
        return Some(available.to_vec());
    }

    let offered: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let valid: Vec<String> = selected
        .iter()
        .filter(|value| offered.contains(value.as_str()) && seen.insert(value.as_str()))
        .cloned()
        .collect();

    let all_selected = valid.len() == available.len();
    let lost_members = valid.len() != selected.len() || valid.is_empty();
    if all_selected || !lost_members {
        return None;
    }
    Some(if valid.is_empty() {
        available.to_vec()
    } else {
        valid
    })
}

/// Applies [`reconcile`] to every dimension whose option set changed.
#[derive(Debug, Default, Clone)]
pub struct SelectionSynchronizer {
    last_seen: BTreeMap<SetDimension, Vec<String>>,
}

impl SelectionSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile `filters` against `options`; returns the dimensions whose
    /// selection changed.
    ///
    /// A dimension is only touched when its options differ from the last
    /// call, so an unchanged option set never overrides the user's edits.
    pub fn sync(&mut self, options: &AvailableOptions, filters: &mut FilterState) -> Vec<SetDimension> {
        options
            .iter()
            .filter_map(|(dimension, available)| {
                self.sync_dimension(dimension, available, filters)
                    .then_some(dimension)
            })
            .collect()
    }

    /// Reconcile one dimension; returns true when its selection changed.
    ///
    /// Callers that recompute `available` after every change converge
    /// faster than a single [`sync`](Self::sync) over a stale option set.
    pub fn sync_dimension(
        &mut self,
        dimension: SetDimension,
        available: &[String],
        filters: &mut FilterState,
    ) -> bool {
        if self
            .last_seen
            .get(&dimension)
            .is_some_and(|seen| seen.as_slice() == available)
        {
            return false;
        }
        self.last_seen.insert(dimension, available.to_vec());
        let Some(selection) = reconcile(available, filters.selection(dimension)) else {
            return false;
        };
        tracing::debug!(
            %dimension,
            available = available.len(),
            selected = selection.len(),
            "reconciled selection"
        );
        filters.set_selection(dimension, selection);
        true
    }

    /// Select every available option of every dimension.
    ///
    /// Used when the level or scope changes: the new option sets become the
    /// baseline and every selection starts fully enumerated.
    pub fn select_all(&mut self, options: &AvailableOptions, filters: &mut FilterState) {
        filters.clear();
        self.last_seen.clear();
        for (dimension, available) in options.iter() {
            self.last_seen.insert(dimension, available.to_vec());
            filters.set_selection(dimension, available.to_vec());
        }
    }

    /// Forget every remembered option set.
    pub fn reset(&mut self) {
        self.last_seen.clear();
    }
}
