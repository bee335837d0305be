//! Display formatting for cell values and year-over-year changes.

use serde::Serialize;

use crate::columns::title_case;
use crate::lookup::NOT_AVAILABLE;
use crate::value::{CellValue, format_numeric};

/// Direction of a year-over-year change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Unchanged,
}

/// Change of a metric between the compare year and the selected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearChange {
    pub current: f64,
    pub previous: f64,
    pub absolute: f64,
    /// Percent change relative to `previous`.
    pub percent: f64,
}

impl YearChange {
    /// `None` when either value is non-numeric or `previous` is zero.
    pub fn between(current: &CellValue, previous: &CellValue) -> Option<Self> {
        let current = current.as_number()?;
        let previous = previous.as_number()?;
        if previous == 0.0 {
            return None;
        }
        let absolute = current - previous;
        Some(Self {
            current,
            previous,
            absolute,
            percent: absolute / previous * 100.0,
        })
    }

    pub fn direction(&self) -> ChangeDirection {
        if self.absolute > 0.0 {
            ChangeDirection::Increase
        } else if self.absolute < 0.0 {
            ChangeDirection::Decrease
        } else {
            ChangeDirection::Unchanged
        }
    }

    /// Signed absolute change, e.g. `+1,250`.
    pub fn absolute_label(&self) -> String {
        format!("{}{}", self.sign(), format_number(self.absolute))
    }

    /// Signed percent change with one decimal, e.g. `-3.2%`.
    pub fn percent_label(&self) -> String {
        format!("{}{:.1}%", self.sign(), self.percent)
    }

    fn sign(&self) -> &'static str {
        if self.absolute >= 0.0 { "+" } else { "" }
    }
}

/// Largest magnitude whose cents still fit in a `u64`.
const MAX_GROUPED: f64 = 1.0e17;

/// Number with thousands separators and at most two decimals.
///
/// Magnitudes beyond [`MAX_GROUPED`] are printed ungrouped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value.abs() >= MAX_GROUPED {
        return format_numeric(value);
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;
    let mut out = String::new();
    if value < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if fraction > 0 {
        let digits = format!("{fraction:02}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cell formatted for display: `N/A` when blank, grouped numbers, raw text.
pub fn format_value(value: &CellValue) -> String {
    if value.is_blank() {
        return NOT_AVAILABLE.to_string();
    }
    match value.as_number() {
        Some(n) => format_number(n),
        None => value.to_string(),
    }
}

/// Percentage with a fixed number of decimals, `N/A` when non-numeric.
pub fn format_percent(value: &CellValue, decimals: usize) -> String {
    match value.as_number() {
        Some(n) => format!("{n:.decimals$}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Land area: `N/A` for blank or zero, three decimals below 1, else two.
pub fn format_area(value: &CellValue) -> String {
    match value.as_number() {
        Some(n) if n != 0.0 => {
            if n < 1.0 {
                format!("{n:.3}")
            } else {
                format!("{n:.2}")
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Change between two cells as `+1,250 (+3.2%)`, `N/A` when undefined.
pub fn format_change(current: &CellValue, previous: &CellValue) -> String {
    YearChange::between(current, previous).map_or_else(
        || NOT_AVAILABLE.to_string(),
        |change| format!("{} ({})", change.absolute_label(), change.percent_label()),
    )
}

/// `acs_median_income.csv` becomes `Acs Median Income`.
pub fn format_dataset_name(filename: &str) -> String {
    let base = filename.replace(".csv", "").replace('_', " ");
    title_case(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30_000_000.0), "30,000,000");
        assert_eq!(format_number(1234.5), "1,234.5");
        assert_eq!(format_number(-1234.567), "-1,234.57");
        assert_eq!(format_number(0.004), "0");
        assert_eq!(format_number(999.999), "1,000");
    }

    #[test]
    fn test_format_number_huge_values_are_not_clamped() {
        assert_eq!(format_number(2.0e20), "200000000000000000000");
        assert_eq!(format_number(-1.0e18), "-1000000000000000000");
        assert_eq!(format_number(9.9e16), "99,000,000,000,000,000");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&CellValue::Null), "N/A");
        assert_eq!(format_value(&CellValue::from("Texas")), "Texas");
        assert_eq!(format_value(&CellValue::from(1400000.0)), "1,400,000");
    }

    #[test]
    fn test_format_percent_and_area() {
        assert_eq!(format_percent(&CellValue::from(12.345), 1), "12.3%");
        assert_eq!(format_percent(&CellValue::from("x"), 1), "N/A");
        assert_eq!(format_area(&CellValue::from(0.5)), "0.500");
        assert_eq!(format_area(&CellValue::from(12.0)), "12.00");
        assert_eq!(format_area(&CellValue::from(0.0)), "N/A");
    }

    #[test]
    fn test_year_change() {
        let change =
            YearChange::between(&CellValue::from(110.0), &CellValue::from(100.0)).unwrap();
        assert_eq!(change.direction(), ChangeDirection::Increase);
        assert_eq!(change.absolute_label(), "+10");
        assert_eq!(change.percent_label(), "+10.0%");

        let drop = YearChange::between(&CellValue::from(90.0), &CellValue::from(100.0)).unwrap();
        assert_eq!(drop.absolute_label(), "-10");
        assert_eq!(drop.percent_label(), "-10.0%");

        assert!(YearChange::between(&CellValue::from(1.0), &CellValue::from(0.0)).is_none());
        assert!(YearChange::between(&CellValue::Null, &CellValue::from(1.0)).is_none());
    }

    #[test]
    fn test_format_change() {
        assert_eq!(
            format_change(&CellValue::from(1250.0), &CellValue::from(1000.0)),
            "+250 (+25.0%)"
        );
        assert_eq!(format_change(&CellValue::from("x"), &CellValue::from(1.0)), "N/A");
    }

    #[test]
    fn test_format_dataset_name() {
        assert_eq!(format_dataset_name("acs_median_income.csv"), "Acs Median Income");
    }
}
