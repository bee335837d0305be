//! Filtering for the census explorer.
//!
//! Evaluates a [`FilterState`](census_model::FilterState) over the rows of a
//! level, computes the options each multi-select should offer, memoizes
//! recent results and keeps selections consistent as options change.

mod cache;
mod derive;
mod engine;
mod options;
mod sort;
mod summary;
mod sync;

pub use cache::{DEFAULT_CAPACITY, FilterKey, FilterResultCache};
pub use derive::{
    AIANNH_COLUMN, CBSA_COLUMN, DISTRICT_COLUMNS, DIVISION_COLUMN, REGION_COLUMN, STATE_COLUMN,
    URBAN_AREA_COLUMN, URBAN_RURAL_COLUMN, derive, is_not_available,
};
pub use engine::{
    FilterPlan, FilterQuery, LAND_AREA_COLUMN, applied_dimensions, covers_scope, evaluate,
    evaluate_excluding, search_fields,
};
pub use options::{AvailableOptions, available_for, available_options, leading_integer};
pub use sort::{SortDirection, SortState, compare_cells};
pub use summary::{active_filter_count, has_active_filters, is_restricting, restricting_dimensions};
pub use sync::{SelectionSynchronizer, reconcile};
