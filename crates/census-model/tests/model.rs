use census_model::columns::{available_years, metric_options, population_column};
use census_model::format::{format_value, YearChange};
use census_model::{
    CellValue, DatasetHandle, FilterState, Level, Manifest, NavigationState, Preferences,
    RangeDimension, Row, SetDimension,
};

fn state_row(name: &str, region: &str, population: f64) -> Row {
    Row::from_pairs([
        ("state_name", CellValue::from(name)),
        ("census_region", CellValue::from(region)),
        ("total_population_2024", CellValue::from(population)),
        ("median_income_2024", CellValue::from(70_000.0)),
        ("median_income_2023", CellValue::from(65_000.0)),
    ])
}

#[test]
fn discovers_years_and_metrics_from_state_columns() {
    let row = state_row("Texas", "3", 30_000_000.0);
    let years = available_years(row.columns());
    assert_eq!(years, vec!["2024", "2023"]);

    let metrics = metric_options(row.columns(), "2024");
    let labels: Vec<_> = metrics.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["Total Population", "Median Income"]);
    assert_eq!(
        population_column(row.columns()),
        Some("total_population_2024")
    );
}

#[test]
fn compares_metric_across_years() {
    let row = state_row("Texas", "3", 30_000_000.0);
    let change = YearChange::between(
        row.get("median_income_2024").unwrap(),
        row.get("median_income_2023").unwrap(),
    )
    .unwrap();
    assert_eq!(change.absolute_label(), "+5,000");
    assert_eq!(change.percent_label(), "+7.7%");
    assert_eq!(
        format_value(row.get("total_population_2024").unwrap()),
        "30,000,000"
    );
}

#[test]
fn navigation_round_trip_keeps_invariants() {
    let nav = NavigationState::national()
        .drill_to_state("Texas")
        .and_then(|nav| nav.drill_to_county("Travis County"))
        .unwrap();
    assert_eq!(nav.level(), Level::Zcta5);
    assert_eq!(nav.current_state(), Some("Texas"));
    assert_eq!(nav.current_county(), Some("Travis County"));

    let county = nav.back().unwrap();
    assert_eq!(county.current_county(), None);
    let state = county.back().unwrap();
    assert_eq!(state.level(), Level::State);
    assert_eq!(state.current_state(), None);
}

#[test]
fn manifest_handles_map_to_level_resources() {
    let manifest: Manifest = serde_json::from_str(
        r#"{"datasets":[{"filename":"census2024.csv","name":"Census 2024","description":"ACS"}]}"#,
    )
    .unwrap();
    let handles = manifest.handles();
    assert_eq!(handles, vec![DatasetHandle::new("census2024")]);
    let paths: Vec<_> = Level::ALL
        .iter()
        .map(|level| handles[0].resource_path(*level))
        .collect();
    assert_eq!(
        paths,
        vec![
            "data/census2024_state.csv",
            "data/census2024_county.csv",
            "data/census2024_zcta5.csv"
        ]
    );
}

#[test]
fn filter_state_round_trips_through_json() {
    let mut state = FilterState::new();
    state.set_selection(
        SetDimension::CongressionalDistrict,
        vec!["1".into(), "10".into()],
    );
    state.set_range(
        RangeDimension::MetricValue,
        census_model::NumericRange::new(Some(1.0), Some(2.0)),
    );
    let json = serde_json::to_string(&state).unwrap();
    let back: FilterState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

#[test]
fn preferences_tolerate_missing_fields() {
    let prefs: Preferences = serde_json::from_str(r#"{"dataset":"census2024"}"#).unwrap();
    assert_eq!(prefs.dataset.as_deref(), Some("census2024"));
    assert!(prefs.year.is_none());
    assert!(!prefs.is_empty());
    assert!(Preferences::default().is_empty());
}
