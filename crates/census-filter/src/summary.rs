//! Active-filter summary for display.

use std::collections::HashSet;

use census_model::{FilterState, RangeDimension, SetDimension};

use crate::options::AvailableOptions;

/// True when `selected` restricts `available`: non-empty and missing at
/// least one available option.
pub fn is_restricting(selected: &[String], available: &[String]) -> bool {
    if selected.is_empty() {
        return false;
    }
    let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
    available.iter().any(|value| !chosen.contains(value.as_str()))
}

/// Set dimensions that currently restrict the results.
pub fn restricting_dimensions(filters: &FilterState, options: &AvailableOptions) -> Vec<SetDimension> {
    options
        .iter()
        .filter(|(d, available)| is_restricting(filters.selection(*d), available))
        .map(|(d, _)| d)
        .collect()
}

/// Restricting set dimensions plus one per present range bound.
pub fn active_filter_count(filters: &FilterState, options: &AvailableOptions) -> usize {
    let ranges: usize = RangeDimension::ALL
        .iter()
        .map(|d| filters.range(*d).bound_count())
        .sum();
    restricting_dimensions(filters, options).len() + ranges
}

pub fn has_active_filters(filters: &FilterState, options: &AvailableOptions) -> bool {
    active_filter_count(filters, options) > 0
}
