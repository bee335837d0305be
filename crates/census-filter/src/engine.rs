//! Filter evaluation over the rows of one level.
//!
//! [`evaluate`] compiles the filter state into a [`FilterPlan`] holding only
//! the restrictions that actually apply, then makes a single stable pass
//! over the rows. When nothing applies the input is returned as-is (same
//! allocation).

use std::collections::HashSet;

use census_model::columns::population_column;
use census_model::{
    FilterState, Level, NumericRange, RangeDimension, Row, Rows, SetDimension,
};

use crate::derive::{derive, is_not_available};

/// Land area column used by the land-area range.
pub const LAND_AREA_COLUMN: &str = "land_area_sq_km";

/// Columns matched by free-text search at `level`.
pub fn search_fields(level: Level) -> &'static [&'static str] {
    match level {
        Level::State => &["state_name", "state_abbr", "state_abbreviation"],
        Level::County => &["county_name", "state_name", "urban_area_name"],
        Level::Zcta5 => &["zcta5", "zcta", "county_name", "state_name"],
    }
}

/// Inputs of one evaluation besides the rows themselves.
#[derive(Debug, Clone, Copy)]
pub struct FilterQuery<'a> {
    pub level: Level,
    pub filters: &'a FilterState,
    pub search: &'a str,
    /// Active metric column; the metric-value range applies only when set.
    pub metric: Option<&'a str>,
}

impl<'a> FilterQuery<'a> {
    pub fn new(level: Level, filters: &'a FilterState) -> Self {
        Self {
            level,
            filters,
            search: "",
            metric: None,
        }
    }

    pub fn with_search(mut self, search: &'a str) -> Self {
        self.search = search;
        self
    }

    pub fn with_metric(mut self, metric: Option<&'a str>) -> Self {
        self.metric = metric;
        self
    }
}

/// Filter `rows` of `level`, preserving row order.
pub fn evaluate(
    level: Level,
    rows: &Rows,
    filters: &FilterState,
    search: &str,
    metric: Option<&str>,
) -> Rows {
    let query = FilterQuery::new(level, filters)
        .with_search(search)
        .with_metric(metric);
    FilterPlan::compile(&query, rows, None).apply(rows)
}

/// Filter `rows` with every restriction except `excluded`'s selection and
/// the search text.
pub fn evaluate_excluding(
    level: Level,
    rows: &Rows,
    filters: &FilterState,
    metric: Option<&str>,
    excluded: SetDimension,
) -> Rows {
    let query = FilterQuery::new(level, filters).with_metric(metric);
    FilterPlan::compile(&query, rows, Some(excluded)).apply(rows)
}

/// Set dimensions whose selection restricts `rows` at `level`.
///
/// A selection is ignored when it is empty, when the dimension does not
/// apply at the level, or when it covers every value present in `rows`.
pub fn applied_dimensions(level: Level, rows: &[Row], filters: &FilterState) -> Vec<SetDimension> {
    SetDimension::for_level(level)
        .filter(|d| {
            let selected = filters.selection(*d);
            !selected.is_empty() && !covers_scope(*d, selected, rows)
        })
        .collect()
}

/// True when `selected` contains every available value of `dimension`
/// present in `rows` (vacuously true when no row has one).
pub fn covers_scope(dimension: SetDimension, selected: &[String], rows: &[Row]) -> bool {
    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
    rows.iter().all(|row| {
        let value = derive(dimension, row);
        is_not_available(&value) || selected.contains(value.as_ref())
    })
}

/// The restrictions of one evaluation, resolved against a table.
#[derive(Debug, Default)]
pub struct FilterPlan<'a> {
    sets: Vec<(SetDimension, HashSet<&'a str>)>,
    ranges: Vec<(String, NumericRange)>,
    search: Option<(String, &'static [&'static str])>,
}

impl<'a> FilterPlan<'a> {
    /// Resolve `query` against `rows`, leaving out `excluded`'s selection.
    pub fn compile(query: &FilterQuery<'a>, rows: &[Row], excluded: Option<SetDimension>) -> Self {
        let sets = applied_dimensions(query.level, rows, query.filters)
            .into_iter()
            .filter(|d| Some(*d) != excluded)
            .map(|d| {
                let values = query.filters.selection(d).iter().map(String::as_str).collect();
                (d, values)
            })
            .collect();

        let ranges = RangeDimension::ALL
            .into_iter()
            .filter_map(|d| {
                let range = query.filters.range(d);
                if range.is_unbounded() {
                    return None;
                }
                range_column(d, rows, query.metric).map(|column| (column, range))
            })
            .collect();

        let needle = query.search.trim().to_lowercase();
        let search = if excluded.is_none() && !needle.is_empty() {
            Some((needle, search_fields(query.level)))
        } else {
            None
        };

        Self {
            sets,
            ranges,
            search,
        }
    }

    /// True when no restriction applies.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.ranges.is_empty() && self.search.is_none()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.sets
            .iter()
            .all(|(d, values)| values.contains(derive(*d, row).as_ref()))
            && self
                .ranges
                .iter()
                .all(|(column, range)| range.contains(row.number(column)))
            && self
                .search
                .as_ref()
                .is_none_or(|(needle, fields)| search_matches(row, needle, fields))
    }

    /// Rows passing every restriction, in input order.
    pub fn apply(&self, rows: &Rows) -> Rows {
        if self.is_empty() {
            return Rows::clone(rows);
        }
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Column a range dimension reads, `None` when it cannot apply.
fn range_column(dimension: RangeDimension, rows: &[Row], metric: Option<&str>) -> Option<String> {
    match dimension {
        RangeDimension::Population => {
            let first = rows.first()?;
            population_column(first.columns()).map(str::to_string)
        }
        RangeDimension::LandArea => Some(LAND_AREA_COLUMN.to_string()),
        RangeDimension::MetricValue => metric.map(str::to_string),
    }
}

fn search_matches(row: &Row, needle: &str, fields: &[&str]) -> bool {
    fields.iter().any(|field| {
        row.text(field)
            .is_some_and(|value| value.to_lowercase().contains(needle))
    })
}
