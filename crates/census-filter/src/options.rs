//! Available options per set dimension.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use census_model::{FilterState, Level, OptionOrdering, Rows, SetDimension};
use serde::Serialize;

use crate::derive::{derive, is_not_available};
use crate::engine::evaluate_excluding;

/// Distinct values offered for each dimension that applies at a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableOptions {
    options: BTreeMap<SetDimension, Vec<String>>,
}

impl AvailableOptions {
    /// Options of `dimension`; empty when it does not apply.
    pub fn get(&self, dimension: SetDimension) -> &[String] {
        self.options
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SetDimension, &[String])> {
        self.options.iter().map(|(d, values)| (*d, values.as_slice()))
    }

    pub fn dimensions(&self) -> impl Iterator<Item = SetDimension> + '_ {
        self.options.keys().copied()
    }
}

/// Compute the options of every dimension that applies at `level`.
///
/// Each dimension sees the rows left by every other active restriction,
/// never its own selection and never the search text.
pub fn available_options(
    level: Level,
    rows: &Rows,
    filters: &FilterState,
    metric: Option<&str>,
) -> AvailableOptions {
    let options = SetDimension::for_level(level)
        .map(|d| (d, available_for(d, level, rows, filters, metric)))
        .collect();
    AvailableOptions { options }
}

/// Options of one dimension, sorted per its [`OptionOrdering`].
pub fn available_for(
    dimension: SetDimension,
    level: Level,
    rows: &Rows,
    filters: &FilterState,
    metric: Option<&str>,
) -> Vec<String> {
    if !dimension.applies_at(level) {
        return Vec::new();
    }
    let filtered = evaluate_excluding(level, rows, filters, metric, dimension);
    let distinct: BTreeSet<String> = filtered
        .iter()
        .map(|row| derive(dimension, row))
        .filter(|value| !is_not_available(value))
        .map(Cow::into_owned)
        .collect();

    let mut values: Vec<String> = distinct.into_iter().collect();
    if dimension.ordering() == OptionOrdering::Numeric {
        values.sort_by_key(|value| leading_integer(value));
    }
    values
}

/// Integer prefix of `value` (`"12"` for `"12-A"`), `0` when there is none.
pub fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use census_model::{CellValue, Row};

    use super::*;

    fn counties() -> Rows {
        Arc::from(vec![
            Row::from_pairs([
                ("county_name", CellValue::from("A")),
                ("congressional_district", CellValue::from(10.0)),
                ("urban_rural", CellValue::from("Urban")),
                ("aiannh_name", CellValue::Null),
            ]),
            Row::from_pairs([
                ("county_name", CellValue::from("B")),
                ("congressional_district", CellValue::from(2.0)),
                ("urban_rural", CellValue::from("Rural")),
                ("aiannh_name", CellValue::from("Navajo Nation")),
            ]),
            Row::from_pairs([
                ("county_name", CellValue::from("C")),
                ("congressional_district", CellValue::from("At-Large")),
                ("urban_rural", CellValue::from("Urban")),
                ("aiannh_name", CellValue::Null),
            ]),
        ])
    }

    #[test]
    fn test_district_options_sort_numerically() {
        let options = available_for(
            SetDimension::CongressionalDistrict,
            Level::County,
            &counties(),
            &FilterState::new(),
            None,
        );
        assert_eq!(options, vec!["At-Large", "2", "10"]);
    }

    #[test]
    fn test_options_exclude_own_selection_only() {
        let rows = counties();
        let mut filters = FilterState::new();
        filters.set_selection(SetDimension::UrbanRural, vec!["Rural".into()]);

        let options = available_options(Level::County, &rows, &filters, None);
        assert_eq!(options.get(SetDimension::UrbanRural), ["Rural", "Urban"]);
        assert_eq!(options.get(SetDimension::Aiannh), ["Navajo Nation"]);
        assert_eq!(options.get(SetDimension::CongressionalDistrict), ["2"]);
        assert!(options.get(SetDimension::Region).is_empty());
    }

    #[test]
    fn test_not_available_is_never_offered() {
        let options = available_for(
            SetDimension::MetroArea,
            Level::County,
            &counties(),
            &FilterState::new(),
            None,
        );
        assert!(options.is_empty());
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("12"), 12);
        assert_eq!(leading_integer("7-A"), 7);
        assert_eq!(leading_integer("At-Large"), 0);
        assert_eq!(leading_integer("-3"), -3);
    }
}
