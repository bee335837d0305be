use anyhow::{Context, Result};
use census_cli::cli::{ScopeArgs, ShowArgs};
use census_cli::render::{RowsView, datasets_grid, options_grid, rows_grid, showing_line};
use census_model::columns::metric_label;
use census_model::{DatasetEntry, DatasetHandle, RangeDimension};
use census_session::{DataSource, Explorer, ExplorerConfig, PreferencesStore};

use crate::progress::LoadProgressBar;

type CliExplorer = Explorer<DataSource>;

pub async fn run_datasets(config: &ExplorerConfig) -> Result<()> {
    let mut explorer = open_explorer(config)?;
    let manifest = explorer
        .load_manifest()
        .await
        .context("failed to load the dataset manifest")?;
    if manifest.is_empty() {
        println!("The manifest lists no datasets.");
        return Ok(());
    }
    println!("{}", datasets_grid(manifest).to_table());
    Ok(())
}

pub async fn run_show(config: &ExplorerConfig, args: &ShowArgs) -> Result<()> {
    let mut explorer = open_explorer(config)?;
    prepare_with_progress(&mut explorer, &args.scope).await?;

    if let Some(year) = &args.compare_year {
        explorer.set_compare_year(Some(year.as_str()))?;
    }
    if let Some(column) = &args.sort {
        explorer.toggle_sort(column);
        if args.desc {
            explorer.toggle_sort(column);
        }
    }

    let level = explorer.level();
    let total = explorer
        .store()
        .scoped(explorer.navigation())
        .map_or(0, |rows| rows.len());
    let rows = explorer
        .filtered_rows()
        .context("the current level is not loaded")?;
    let active = explorer.active_filter_count();
    let compare_year = explorer.compare_year();

    print_heading(&explorer);
    let view = RowsView {
        level,
        metric: explorer.metric(),
        compare_year: compare_year.as_deref(),
        limit: args.limit,
    };
    println!("{}", rows_grid(&view, &rows).to_table());
    println!("{}", showing_line(level, rows.len(), total, active));
    if args.limit > 0 && rows.len() > args.limit {
        println!("Printed the first {}; pass --limit 0 to print all.", args.limit);
    }
    Ok(())
}

pub async fn run_options(config: &ExplorerConfig, scope: &ScopeArgs) -> Result<()> {
    let mut explorer = open_explorer(config)?;
    prepare_with_progress(&mut explorer, scope).await?;

    let options = explorer.available_options();
    print_heading(&explorer);
    println!(
        "{}",
        options_grid(&options, explorer.applied_filters()).to_table()
    );
    Ok(())
}

pub fn run_config(config: &ExplorerConfig) -> Result<()> {
    let text = config.to_toml()?;
    print!("{text}");
    Ok(())
}

fn open_explorer(config: &ExplorerConfig) -> Result<CliExplorer> {
    let source = config
        .data_source()
        .context("failed to set up the data source")?;
    Ok(Explorer::new(source, config).with_preferences(PreferencesStore::default_location()))
}

async fn prepare_with_progress(explorer: &mut CliExplorer, scope: &ScopeArgs) -> Result<()> {
    let progress = LoadProgressBar::start(explorer.subscribe_progress());
    let prepared = prepare(explorer, scope).await;
    progress.finish();
    prepared
}

/// Open the dataset, move to the requested position and apply filters.
async fn prepare(explorer: &mut CliExplorer, scope: &ScopeArgs) -> Result<()> {
    explorer
        .load_manifest()
        .await
        .context("failed to load the dataset manifest")?;
    select_dataset(explorer, scope.dataset.as_deref()).await?;

    if let Some(year) = &scope.year {
        explorer.select_year(year)?;
    }
    if let Some(metric) = &scope.metric {
        explorer.select_metric(metric)?;
    }
    if let Some(state) = &scope.state {
        explorer
            .drill_to_state(state)
            .await
            .with_context(|| format!("failed to open state '{state}'"))?;
    }
    if let Some(county) = &scope.county {
        explorer
            .drill_to_county(county)
            .await
            .with_context(|| format!("failed to open county '{county}'"))?;
    }

    let level = explorer.level();
    for filter in &scope.filters {
        if !filter.dimension.applies_at(level) {
            tracing::warn!(dimension = %filter.dimension, %level, "filter does not apply at this level");
        }
        explorer.set_selection(filter.dimension, filter.values.clone());
    }
    let ranges = [
        (RangeDimension::Population, scope.population()),
        (RangeDimension::LandArea, scope.land_area()),
        (RangeDimension::MetricValue, scope.metric_value()),
    ];
    for (dimension, range) in ranges {
        if !range.is_unbounded() {
            explorer.set_range(dimension, range);
        }
    }
    if let Some(search) = &scope.search {
        explorer.set_search(search.as_str());
    }
    explorer.flush_filters();
    Ok(())
}

/// The named dataset, else the saved one, else the first in the manifest.
async fn select_dataset(explorer: &mut CliExplorer, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        let handle = DatasetHandle::from_filename(name);
        return explorer
            .select_dataset(handle.clone())
            .await
            .with_context(|| format!("failed to open dataset '{handle}'"));
    }

    match explorer.restore_preferences().await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(err) => tracing::warn!(error = %err, "saved dataset could not be restored"),
    }
    let handle = explorer
        .manifest()
        .and_then(|manifest| manifest.datasets.first())
        .map(DatasetEntry::handle)
        .context("the manifest lists no datasets")?;
    explorer
        .select_dataset(handle.clone())
        .await
        .with_context(|| format!("failed to open dataset '{handle}'"))
}

fn print_heading(explorer: &CliExplorer) {
    let Some(handle) = explorer.dataset() else {
        return;
    };
    let name = explorer
        .manifest()
        .and_then(|manifest| manifest.find(handle))
        .map_or_else(|| handle.display_name(), DatasetEntry::display_name);
    let mut heading = name;
    if let Some(year) = explorer.year() {
        heading.push_str(&format!(" · {year}"));
    }
    if let Some(metric) = explorer.metric() {
        heading.push_str(&format!(" · {}", metric_label(metric)));
    }
    println!("{heading}");
    println!("{} ({})", explorer.breadcrumb(), explorer.level().label());
}
