//! Census explorer data model.
//!
//! Shared types for every layer of the explorer:
//!
//! - [`Row`] / [`CellValue`] / [`Schema`]: one parsed record of a per-level table
//! - [`Level`]: geographic granularity (`state < county < zcta5`)
//! - [`DatasetHandle`] / [`Manifest`]: dataset families and their catalog
//! - [`FilterState`]: set and range dimension selections
//! - [`NavigationState`]: drill-down position with its invariants
//! - [`columns`]: year / metric / population column discovery
//! - [`format`]: display formatting for values and year-over-year changes

pub mod columns;
pub mod format;
pub mod lookup;

mod dataset;
mod error;
mod filter;
mod level;
mod navigation;
mod preferences;
mod row;
mod value;

pub use dataset::{DatasetEntry, DatasetHandle, MANIFEST_PATH, Manifest};
pub use error::{ModelError, Result};
pub use filter::{FilterState, NumericRange, OptionOrdering, RangeDimension, SetDimension};
pub use level::Level;
pub use lookup::NOT_AVAILABLE;
pub use navigation::NavigationState;
pub use preferences::Preferences;
pub use row::{Row, Rows, Schema};
pub use value::CellValue;
