//! End-to-end filtering scenarios over a small state table.

use std::sync::Arc;

use census_filter::{
    FilterKey, FilterResultCache, SelectionSynchronizer, active_filter_count, available_options,
    evaluate,
};
use census_model::{
    CellValue, DatasetHandle, FilterState, Level, NumericRange, RangeDimension, Row, Rows,
    SetDimension,
};

fn states() -> Rows {
    let row = |name: &str, region: f64, division: f64, population: f64| {
        Row::from_pairs([
            ("state_name", CellValue::from(name)),
            ("census_region", CellValue::from(region)),
            ("census_division", CellValue::from(division)),
            ("total_population_2024", CellValue::from(population)),
        ])
    };
    Arc::from(vec![
        row("Maine", 1.0, 1.0, 1_400_000.0),
        row("Ohio", 2.0, 3.0, 11_800_000.0),
        row("Texas", 3.0, 7.0, 30_500_000.0),
        row("Vermont", 1.0, 1.0, 650_000.0),
    ])
}

fn names(rows: &Rows) -> Vec<String> {
    rows.iter()
        .map(|r| r.text("state_name").unwrap_or_default().into_owned())
        .collect()
}

#[test]
fn region_selection_narrows_states_and_their_options() {
    let rows = states();
    let mut filters = FilterState::new();
    let mut sync = SelectionSynchronizer::new();
    let options = available_options(Level::State, &rows, &filters, None);
    sync.select_all(&options, &mut filters);
    assert_eq!(evaluate(Level::State, &rows, &filters, "", None).len(), 4);
    assert_eq!(active_filter_count(&filters, &options), 0);

    filters.set_selection(SetDimension::Region, vec!["Northeast".into()]);
    let out = evaluate(Level::State, &rows, &filters, "", None);
    assert_eq!(names(&out), vec!["Maine", "Vermont"]);

    let options = available_options(Level::State, &rows, &filters, None);
    assert_eq!(options.get(SetDimension::Division), ["New England"]);
    assert_eq!(
        options.get(SetDimension::Region),
        ["Midwest", "Northeast", "South"]
    );
    assert_eq!(active_filter_count(&filters, &options), 1);

    // The state selection still lists all four names; every one of the
    // two remaining states is covered, so it stays full.
    let changed = sync.sync(&options, &mut filters);
    assert!(changed.is_empty());
    assert_eq!(filters.selection(SetDimension::State).len(), 4);
}

#[test]
fn population_minimum_and_search_combine() {
    let rows = states();
    let mut filters = FilterState::new();
    filters.set_range(RangeDimension::Population, NumericRange::at_least(2_000_000.0));
    let out = evaluate(Level::State, &rows, &filters, "", None);
    assert_eq!(names(&out), vec!["Ohio", "Texas"]);

    let searched = evaluate(Level::State, &rows, &filters, "OH", None);
    assert_eq!(names(&searched), vec!["Ohio"]);
}

#[test]
fn district_selection_is_ignored_for_states() {
    let rows = states();
    let mut filters = FilterState::new();
    filters.set_selection(SetDimension::CongressionalDistrict, vec!["7".into()]);
    let out = evaluate(Level::State, &rows, &filters, "", None);
    assert!(Arc::ptr_eq(&rows, &out));
}

#[test]
fn cache_reuses_results_for_identical_inputs() {
    let rows = states();
    let dataset = DatasetHandle::new("census2024");
    let mut filters = FilterState::new();
    filters.set_selection(SetDimension::Region, vec!["South".into()]);
    let mut cache = FilterResultCache::default();

    let key = FilterKey {
        dataset: &dataset,
        level: Level::State,
        state: None,
        county: None,
        filters: &filters,
        search: "",
        metric: None,
    };
    let first = cache.get_or_compute(&key, || evaluate(Level::State, &rows, &filters, "", None));
    let second = cache.get_or_compute(&key, || unreachable!("cached"));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(names(&second), vec!["Texas"]);
}

#[test]
fn options_snapshot_for_full_table() {
    let options = available_options(Level::State, &states(), &FilterState::new(), None);
    insta::assert_json_snapshot!(options, @r###"
    {
      "options": {
        "region": [
          "Midwest",
          "Northeast",
          "South"
        ],
        "division": [
          "East North Central",
          "New England",
          "West South Central"
        ],
        "state": [
          "Maine",
          "Ohio",
          "Texas",
          "Vermont"
        ]
      }
    }
    "###);
}
