//! Explorer flows over an in-memory dataset.

use std::sync::Arc;
use std::time::Duration;

use census_ingest::MemoryFetcher;
use census_model::{DatasetHandle, Level, NumericRange, RangeDimension, SetDimension};
use census_session::{Explorer, ExplorerConfig, ExplorerError, ExplorerEvent, PreferencesStore};
use census_store::LoadFailure;

const MANIFEST: &str = r#"{"datasets": [{"filename": "census2024.csv", "name": "Census 2024"}]}"#;

const STATES: &str = "\
state_name,state_abbr,census_region,census_division,total_population_2023,total_population_2024,median_income_2023,median_income_2024
Texas,TX,3,7,30000000,30500000,70000,73000
Maine,ME,1,1,1390000,1400000,60000,61000
";

const COUNTIES: &str = "\
county_name,state_name,congressional_district,urban_rural,total_population_2024
Travis County,Texas,10,Urban,1300000
Harris County,Texas,7,Urban,4800000
Loving County,Texas,11,Rural,64
York County,Maine,1,Urban,210000
";

const ZCTAS: &str = "\
zcta5,county_name,state_name,total_population_2024
78701,Travis County,Texas,10000
78702,Travis County,Texas,20000
04090,York County,Maine,9000
";

fn fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_resource("data/manifest.json", MANIFEST)
        .with_resource("data/census2024_state.csv", STATES)
        .with_resource("data/census2024_county.csv", COUNTIES)
        .with_resource("data/census2024_zcta5.csv", ZCTAS)
        .with_resource("data/noyears_state.csv", "state_name\nTexas\n")
}

fn explorer() -> Explorer<MemoryFetcher> {
    Explorer::new(fetcher(), &ExplorerConfig::default())
}

fn census2024() -> DatasetHandle {
    DatasetHandle::new("census2024")
}

fn names(explorer: &mut Explorer<MemoryFetcher>, column: &str) -> Vec<String> {
    explorer
        .filtered_rows()
        .expect("level loaded")
        .iter()
        .map(|row| row.text(column).unwrap_or_default().into_owned())
        .collect()
}

#[tokio::test]
async fn selecting_a_dataset_picks_newest_year_and_first_metric() {
    let mut explorer = explorer();
    let mut events = explorer.subscribe();
    explorer.select_dataset(census2024()).await.unwrap();

    assert_eq!(explorer.dataset(), Some(&census2024()));
    assert_eq!(explorer.available_years(), vec!["2024", "2023"]);
    assert_eq!(explorer.year(), Some("2024"));
    assert_eq!(explorer.metric(), Some("total_population_2024"));
    assert_eq!(explorer.compare_year().as_deref(), Some("2023"));
    assert_eq!(explorer.level(), Level::State);
    assert_eq!(names(&mut explorer, "state_name"), vec!["Texas", "Maine"]);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&ExplorerEvent::DatasetSelected {
        handle: census2024()
    }));
}

#[tokio::test]
async fn drill_then_back_resets_state_level_filters() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();

    explorer.drill_to_state("Texas").await.unwrap();
    assert_eq!(explorer.level(), Level::County);
    assert_eq!(explorer.breadcrumb(), "Texas");
    assert_eq!(
        names(&mut explorer, "county_name"),
        vec!["Travis County", "Harris County", "Loving County"]
    );
    assert_eq!(
        explorer.available_options().get(SetDimension::CongressionalDistrict),
        ["7", "10", "11"]
    );

    assert!(explorer.go_back());
    assert_eq!(explorer.level(), Level::State);
    assert_eq!(explorer.navigation().current_state(), None);

    let filters = explorer.applied_filters();
    assert_eq!(filters.selection(SetDimension::Region), ["Northeast", "South"]);
    assert_eq!(filters.selection(SetDimension::State), ["Maine", "Texas"]);
    assert!(filters.selection(SetDimension::CongressionalDistrict).is_empty());
    assert_eq!(explorer.active_filter_count(), 0);
    assert_eq!(names(&mut explorer, "state_name").len(), 2);

    assert!(!explorer.go_back());
}

#[tokio::test]
async fn drilling_to_a_county_scopes_zip_codes() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.drill_to_state("Texas").await.unwrap();
    explorer.drill_to_county("Travis County").await.unwrap();

    assert_eq!(explorer.level(), Level::Zcta5);
    assert_eq!(explorer.breadcrumb(), "Travis County, Texas");
    assert_eq!(names(&mut explorer, "zcta5"), vec!["78701", "78702"]);

    explorer.reset();
    assert_eq!(explorer.level(), Level::State);
    assert_eq!(explorer.breadcrumb(), "United States");
}

#[tokio::test]
async fn drilling_to_a_county_from_the_national_view_is_rejected() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    let err = explorer.drill_to_county("Travis County").await.unwrap_err();
    assert!(matches!(err, ExplorerError::Navigation(_)));
    assert_eq!(explorer.level(), Level::State);
}

#[tokio::test]
async fn navigation_requires_a_dataset() {
    let mut explorer = explorer();
    let err = explorer.drill_to_state("Texas").await.unwrap_err();
    assert!(matches!(err, ExplorerError::NoDataset));
}

#[tokio::test(start_paused = true)]
async fn filter_edits_apply_after_the_debounce_window() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.drill_to_state("Texas").await.unwrap();

    explorer.set_selection(SetDimension::UrbanRural, vec!["Rural".into()]);
    explorer.set_selection(SetDimension::CongressionalDistrict, vec!["10".into()]);
    assert_eq!(names(&mut explorer, "county_name").len(), 3);

    tokio::time::sleep(Duration::from_millis(150)).await;
    // No rural county is in district 10, so urban/rural falls back to the
    // only value left.
    assert_eq!(names(&mut explorer, "county_name"), vec!["Travis County"]);
    assert_eq!(
        explorer.filter_edits().selection(SetDimension::UrbanRural),
        ["Urban"]
    );
    assert_eq!(explorer.active_filter_count(), 1);

    explorer.set_selection(
        SetDimension::CongressionalDistrict,
        vec!["7".into(), "10".into()],
    );
    explorer.flush_filters();
    assert_eq!(
        names(&mut explorer, "county_name"),
        vec!["Travis County", "Harris County"]
    );
    assert_eq!(explorer.active_filter_count(), 0);
}

#[tokio::test]
async fn range_and_search_combine_at_state_level() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();

    explorer.set_range(RangeDimension::Population, NumericRange::at_least(2_000_000.0));
    explorer.flush_filters();
    assert_eq!(names(&mut explorer, "state_name"), vec!["Texas"]);

    explorer.set_search("me");
    explorer.clear_ranges();
    explorer.flush_filters();
    assert_eq!(names(&mut explorer, "state_name"), vec!["Maine"]);
}

#[tokio::test]
async fn unchanged_inputs_reuse_the_cached_result() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    let first = explorer.filtered_rows().unwrap();
    let second = explorer.filtered_rows().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn sort_toggles_and_navigation_clears_it() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();

    explorer.toggle_sort("total_population_2024");
    assert_eq!(names(&mut explorer, "state_name"), vec!["Maine", "Texas"]);
    explorer.toggle_sort("total_population_2024");
    assert_eq!(names(&mut explorer, "state_name"), vec!["Texas", "Maine"]);

    explorer.drill_to_state("Texas").await.unwrap();
    assert!(!explorer.sort().is_active());
}

#[tokio::test]
async fn failed_dataset_selection_keeps_the_previous_one() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.select_year("2023").unwrap();
    let before = explorer.selection().clone();

    let err = explorer
        .select_dataset(DatasetHandle::new("missing"))
        .await
        .unwrap_err();
    match &err {
        ExplorerError::Load(load) => assert_eq!(load.reason(), LoadFailure::NotFound),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.suggestion().is_some());
    assert_eq!(explorer.selection(), &before);
    assert_eq!(names(&mut explorer, "state_name").len(), 2);

    let err = explorer
        .select_dataset(DatasetHandle::new("noyears"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExplorerError::NoYears { .. }));
    assert_eq!(explorer.selection(), &before);
}

#[tokio::test]
async fn manifest_limits_selectable_datasets() {
    let mut explorer = explorer();
    let manifest = explorer.load_manifest().await.unwrap();
    assert_eq!(manifest.handles(), vec![census2024()]);

    let err = explorer
        .select_dataset(DatasetHandle::new("noyears"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExplorerError::UnknownDataset { .. }));
    assert_eq!(explorer.dataset(), None);
}

#[tokio::test]
async fn year_change_keeps_or_replaces_the_metric() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.select_metric("median_income_2024").unwrap();

    explorer.select_year("2023").unwrap();
    assert_eq!(explorer.metric(), Some("total_population_2023"));
    assert_eq!(explorer.compare_year(), None);

    assert!(matches!(
        explorer.select_year("1999"),
        Err(ExplorerError::UnknownYear { .. })
    ));
    assert!(matches!(
        explorer.select_metric("median_income_2024"),
        Err(ExplorerError::UnknownMetric { .. })
    ));
}

#[tokio::test]
async fn comparison_uses_the_compare_year_column() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.select_metric("median_income_2024").unwrap();

    let rows = explorer.filtered_rows().unwrap();
    let comparison = explorer.comparison(&rows[0]).unwrap();
    assert_eq!(comparison.compare_year, "2023");
    let change = comparison.change.unwrap();
    assert_eq!(change.absolute, 3000.0);
    assert_eq!(change.absolute_label(), "+3,000");

    explorer.set_compare_year(Some("2024")).unwrap();
    let same_year = explorer.comparison(&rows[0]).unwrap();
    assert_eq!(same_year.change.unwrap().absolute, 0.0);

    explorer.set_compare_year(None).unwrap();
    assert_eq!(explorer.compare_year().as_deref(), Some("2023"));
}

#[tokio::test]
async fn preferences_restore_the_last_choice() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferencesStore::at(dir.path().join("census_prefs.json"));

    let mut first = explorer().with_preferences(prefs.clone());
    first.select_dataset(census2024()).await.unwrap();
    first.select_year("2023").unwrap();
    first.select_metric("median_income_2023").unwrap();

    let mut second = explorer().with_preferences(prefs);
    assert!(second.restore_preferences().await.unwrap());
    assert_eq!(second.dataset(), Some(&census2024()));
    assert_eq!(second.year(), Some("2023"));
    assert_eq!(second.metric(), Some("median_income_2023"));
}

#[tokio::test]
async fn clearing_the_dataset_clears_year_and_metric() {
    let mut explorer = explorer();
    explorer.select_dataset(census2024()).await.unwrap();
    explorer.clear_dataset();
    assert_eq!(explorer.dataset(), None);
    assert_eq!(explorer.year(), None);
    assert_eq!(explorer.metric(), None);
    assert!(explorer.filtered_rows().is_none());
}
