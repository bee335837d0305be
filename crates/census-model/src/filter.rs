//! Filter dimensions and the filter state record.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::level::Level;

/// How the available options of a set dimension are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrdering {
    Alphabetical,
    /// Numeric by leading integer, non-numeric values sort as `0`.
    Numeric,
}

/// Categorical dimensions filtered by membership.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SetDimension {
    Region,
    Division,
    State,
    UrbanRural,
    MetroArea,
    CongressionalDistrict,
    Aiannh,
}

impl SetDimension {
    pub const ALL: [SetDimension; 7] = [
        Self::Region,
        Self::Division,
        Self::State,
        Self::UrbanRural,
        Self::MetroArea,
        Self::CongressionalDistrict,
        Self::Aiannh,
    ];

    pub const fn key(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Division => "division",
            Self::State => "state",
            Self::UrbanRural => "urban_rural",
            Self::MetroArea => "metro_area",
            Self::CongressionalDistrict => "congressional_district",
            Self::Aiannh => "aiannh",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Region => "Region",
            Self::Division => "Division",
            Self::State => "State",
            Self::UrbanRural => "Urban/Rural",
            Self::MetroArea => "Metro Area",
            Self::CongressionalDistrict => "Congressional District",
            Self::Aiannh => "Tribal Area",
        }
    }

    /// Whether the dimension filters rows of `level`; elsewhere it is ignored.
    pub const fn applies_at(&self, level: Level) -> bool {
        match self {
            Self::Region | Self::Division | Self::State => matches!(level, Level::State),
            Self::CongressionalDistrict => matches!(level, Level::County),
            Self::UrbanRural | Self::MetroArea | Self::Aiannh => {
                matches!(level, Level::County | Level::Zcta5)
            }
        }
    }

    pub const fn ordering(&self) -> OptionOrdering {
        match self {
            Self::CongressionalDistrict => OptionOrdering::Numeric,
            _ => OptionOrdering::Alphabetical,
        }
    }

    /// Dimensions that apply at `level`.
    pub fn for_level(level: Level) -> impl Iterator<Item = SetDimension> {
        Self::ALL.into_iter().filter(move |d| d.applies_at(level))
    }
}

impl fmt::Display for SetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SetDimension {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|d| d.key() == key)
            .ok_or_else(|| ModelError::UnknownDimension(s.to_string()))
    }
}

/// Numeric dimensions filtered by an inclusive range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RangeDimension {
    Population,
    LandArea,
    /// Value of the active metric column; ignored while no metric is set.
    MetricValue,
}

impl RangeDimension {
    pub const ALL: [RangeDimension; 3] = [Self::Population, Self::LandArea, Self::MetricValue];

    pub const fn key(&self) -> &'static str {
        match self {
            Self::Population => "population",
            Self::LandArea => "land_area",
            Self::MetricValue => "metric_value",
        }
    }
}

impl fmt::Display for RangeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Optional inclusive bounds; an absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub const UNBOUNDED: NumericRange = NumericRange {
        min: None,
        max: None,
    };

    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    pub fn at_most(max: f64) -> Self {
        Self::new(None, Some(max))
    }

    /// Build a range from raw text bounds; blank or non-numeric text is absent.
    pub fn parse(min: &str, max: &str) -> Self {
        Self::new(parse_bound(min), parse_bound(max))
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Number of bounds present (0, 1 or 2).
    pub fn bound_count(&self) -> usize {
        usize::from(self.min.is_some()) + usize::from(self.max.is_some())
    }
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Selections for every filter dimension.
///
/// An empty set selection means "no restriction". Empty selections and
/// unbounded ranges are not stored, so two states with the same effective
/// content compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    selections: BTreeMap<SetDimension, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ranges: BTreeMap<RangeDimension, NumericRange>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected values of `dimension` (empty slice when unrestricted).
    pub fn selection(&self, dimension: SetDimension) -> &[String] {
        self.selections
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace the selection of `dimension`. Repeated values are dropped.
    pub fn set_selection(&mut self, dimension: SetDimension, mut values: Vec<String>) {
        let mut seen = HashSet::new();
        values.retain(|value| seen.insert(value.clone()));
        if values.is_empty() {
            self.selections.remove(&dimension);
        } else {
            self.selections.insert(dimension, values);
        }
    }

    pub fn clear_selection(&mut self, dimension: SetDimension) {
        self.selections.remove(&dimension);
    }

    pub fn range(&self, dimension: RangeDimension) -> NumericRange {
        self.ranges.get(&dimension).copied().unwrap_or_default()
    }

    pub fn set_range(&mut self, dimension: RangeDimension, range: NumericRange) {
        if range.is_unbounded() {
            self.ranges.remove(&dimension);
        } else {
            self.ranges.insert(dimension, range);
        }
    }

    pub fn clear_ranges(&mut self) {
        self.ranges.clear();
    }

    pub fn clear(&mut self) {
        self.selections.clear();
        self.ranges.clear();
    }

    /// True when every selection is empty and every range unbounded.
    pub fn is_unrestricted(&self) -> bool {
        self.selections.is_empty() && self.ranges.is_empty()
    }

    pub fn has_ranges(&self) -> bool {
        !self.ranges.is_empty()
    }
}
