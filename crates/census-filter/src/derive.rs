//! Derived dimension values.
//!
//! Every set dimension reads a fixed column (or chain of fallback columns)
//! of a row. Blank or missing values become [`NOT_AVAILABLE`]. The engine
//! and the available-options computation both go through [`derive`], so
//! the two can never disagree about a row's value.

use std::borrow::Cow;

use census_model::lookup::{division_name, region_name};
use census_model::{NOT_AVAILABLE, Row, SetDimension};

pub const REGION_COLUMN: &str = "census_region";
pub const DIVISION_COLUMN: &str = "census_division";
pub const STATE_COLUMN: &str = "state_name";
pub const URBAN_RURAL_COLUMN: &str = "urban_rural";
pub const URBAN_AREA_COLUMN: &str = "urban_area_name";
pub const CBSA_COLUMN: &str = "cbsa_code";
pub const AIANNH_COLUMN: &str = "aiannh_name";

/// Congressional district columns, in order of preference.
pub const DISTRICT_COLUMNS: [&str; 2] = ["congressional_district", "cd116"];

/// Value of `dimension` for `row`.
pub fn derive(dimension: SetDimension, row: &Row) -> Cow<'_, str> {
    let value = match dimension {
        SetDimension::Region => row
            .text(REGION_COLUMN)
            .map(|code| Cow::Borrowed(region_name(&code))),
        SetDimension::Division => row
            .text(DIVISION_COLUMN)
            .map(|code| Cow::Borrowed(division_name(&code))),
        SetDimension::State => row.text(STATE_COLUMN),
        SetDimension::UrbanRural => row.text(URBAN_RURAL_COLUMN),
        SetDimension::MetroArea => row.text(URBAN_AREA_COLUMN).or_else(|| {
            row.text(CBSA_COLUMN)
                .map(|code| Cow::Owned(format!("CBSA: {code}")))
        }),
        SetDimension::CongressionalDistrict => {
            DISTRICT_COLUMNS.iter().find_map(|column| row.text(column))
        }
        SetDimension::Aiannh => row.text(AIANNH_COLUMN),
    };
    value.unwrap_or(Cow::Borrowed(NOT_AVAILABLE))
}

/// True when `value` is the missing-value sentinel.
pub fn is_not_available(value: &str) -> bool {
    value == NOT_AVAILABLE
}
