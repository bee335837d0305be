//! Column discovery: years, metrics and the population column.
//!
//! Metric columns carry a four-digit year suffix (`median_income_2023`).
//! The set of years and metrics offered for a dataset is read from the
//! column names of its state-level table.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static YEAR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d{4})$").expect("Invalid year suffix regex"));

static POPULATION_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^total_population_(\d{4})$").expect("Invalid population column regex")
});

/// Substring identifying any total-population column.
const POPULATION_MARKER: &str = "total_population";

/// A selectable metric column for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOption {
    /// Full column name, e.g. `median_income_2023`.
    pub column: String,
    /// Display label, e.g. `Median Income`.
    pub label: String,
}

/// Year encoded in a column name's `_YYYY` suffix.
pub fn year_of(column: &str) -> Option<&str> {
    YEAR_SUFFIX
        .captures(column)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Distinct years found in column suffixes, newest first.
pub fn available_years<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let years: BTreeSet<&str> = columns.iter().filter_map(|c| year_of(c.as_ref())).collect();
    years.into_iter().rev().map(str::to_string).collect()
}

/// Metric columns for `year`, in column order.
pub fn metric_options<S: AsRef<str>>(columns: &[S], year: &str) -> Vec<MetricOption> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| year_of(c) == Some(year))
        .map(|c| MetricOption {
            column: c.to_string(),
            label: metric_label(c),
        })
        .collect()
}

/// Label for a metric column: year suffix removed, underscores to spaces,
/// each word capitalised.
pub fn metric_label(column: &str) -> String {
    let base = YEAR_SUFFIX.replace(column, "");
    title_case(&base.replace('_', " "))
}

/// The year preceding `year`, if it is one of `years`.
pub fn previous_year(year: &str, years: &[String]) -> Option<String> {
    let value: i32 = year.trim().parse().ok()?;
    let previous = (value - 1).to_string();
    years.contains(&previous).then_some(previous)
}

/// The same metric column for a different year.
pub fn column_for_year(column: &str, year: &str) -> Option<String> {
    year_of(column)?;
    Some(YEAR_SUFFIX.replace(column, format!("_{year}")).into_owned())
}

/// Resolve the population column of a table.
///
/// Prefers `total_population_YYYY` with the newest year, then any column
/// whose name contains `total_population`.
pub fn population_column<S: AsRef<str>>(columns: &[S]) -> Option<&str> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|c| {
            POPULATION_COLUMN
                .captures(c)
                .and_then(|caps| caps.get(1))
                .map(|year| (year.as_str(), c))
        })
        .max_by(|a, b| a.0.cmp(b.0))
        .map(|(_, c)| c)
        .or_else(|| {
            columns
                .iter()
                .map(AsRef::as_ref)
                .find(|c| c.contains(POPULATION_MARKER))
        })
}

/// Uppercase the first character of every word (runs of alphanumerics).
pub(crate) fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_available_years_newest_first() {
        let columns = cols(&[
            "state_name",
            "median_income_2022",
            "median_income_2024",
            "total_population_2023",
            "code_12345",
        ]);
        assert_eq!(available_years(&columns), vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn test_metric_options_for_year() {
        let columns = cols(&["state_name", "median_income_2023", "poverty_rate_2023", "x_2022"]);
        let options = metric_options(&columns, "2023");
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].column, "median_income_2023");
        assert_eq!(options[0].label, "Median Income");
        assert_eq!(options[1].label, "Poverty Rate");
    }

    #[test]
    fn test_previous_year() {
        let years = cols(&["2024", "2023"]);
        assert_eq!(previous_year("2024", &years).as_deref(), Some("2023"));
        assert_eq!(previous_year("2023", &years), None);
        assert_eq!(previous_year("abc", &years), None);
    }

    #[test]
    fn test_population_column_prefers_newest_year() {
        let columns = cols(&[
            "total_population_2022",
            "total_population_2024",
            "total_population_2023",
        ]);
        assert_eq!(population_column(&columns), Some("total_population_2024"));

        let fallback = cols(&["name", "total_population_estimate"]);
        assert_eq!(
            population_column(&fallback),
            Some("total_population_estimate")
        );
        assert_eq!(population_column(&cols(&["name"])), None);
    }

    #[test]
    fn test_column_for_year() {
        assert_eq!(
            column_for_year("median_income_2024", "2023").as_deref(),
            Some("median_income_2023")
        );
        assert_eq!(column_for_year("state_name", "2023"), None);
    }
}
