use std::fs;

use census_ingest::{Fetcher, FsFetcher, IngestErrorKind, load_manifest, parse_rows};
use census_model::{CellValue, DatasetHandle, Level};

fn write_data_dir(dir: &std::path::Path) {
    let data = dir.join("data");
    fs::create_dir_all(&data).expect("create data dir");
    fs::write(
        data.join("manifest.json"),
        r#"{"datasets":[{"filename":"census2024.csv","name":"Census 2024"}]}"#,
    )
    .expect("write manifest");
    fs::write(
        data.join("census2024_state.csv"),
        "state_name,census_region,total_population_2024\nTexas,3,30000000\nMaine,1,1400000\n",
    )
    .expect("write state csv");
}

#[tokio::test]
async fn reads_manifest_and_state_table_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_data_dir(dir.path());
    let fetcher = FsFetcher::new(dir.path());

    let manifest = load_manifest(&fetcher).await.expect("manifest");
    let handle = manifest.handles().remove(0);
    assert_eq!(handle, DatasetHandle::new("census2024"));

    let text = fetcher
        .fetch_text(&handle.resource_path(Level::State))
        .await
        .expect("state csv");
    let rows = parse_rows(&text).expect("parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].get("total_population_2024"),
        Some(&CellValue::Number(30_000_000.0))
    );
}

#[tokio::test]
async fn missing_level_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_data_dir(dir.path());
    let fetcher = FsFetcher::new(dir.path());

    let err = fetcher
        .fetch_text(&DatasetHandle::new("census2024").resource_path(Level::County))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "resource not found: data/census2024_county.csv"
    );
}

#[tokio::test]
async fn base_prefix_selects_subdirectory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_data_dir(&dir.path().join("explorer"));
    let fetcher = FsFetcher::new(dir.path()).with_base_prefix("/explorer");
    let manifest = load_manifest(&fetcher).await.expect("manifest");
    assert_eq!(manifest.datasets.len(), 1);
}
