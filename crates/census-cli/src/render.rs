//! Turning explorer state into printable tables.
//!
//! Everything is first rendered into a [`Grid`] of display strings, then
//! styled into a `comfy_table::Table`. Keeping the two steps apart lets the
//! text be checked without terminal styling in the way.

use std::borrow::Cow;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use census_filter::{AvailableOptions, LAND_AREA_COLUMN, is_restricting};
use census_model::columns::{column_for_year, metric_label, population_column};
use census_model::format::{format_area, format_change, format_value};
use census_model::{CellValue, FilterState, Level, Manifest, Row};

const TABLE_WIDTH: u16 = 120;

/// Header plus rows of already formatted cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Columns printed right-aligned.
    #[serde(skip)]
    pub numeric: Vec<usize>,
}

impl Grid {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(self.headers.iter().map(|h| header_cell(h)));
        apply_table_style(&mut table);
        for row in &self.rows {
            table.add_row(row.iter().map(|value| value_cell(value)));
        }
        for &index in &self.numeric {
            if let Some(column) = table.column_mut(index) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
        table
    }
}

/// What the row table shows besides the place name.
#[derive(Debug, Clone, Copy)]
pub struct RowsView<'a> {
    pub level: Level,
    pub metric: Option<&'a str>,
    pub compare_year: Option<&'a str>,
    /// Rows beyond this are left out; 0 prints all.
    pub limit: usize,
}

/// Column holding the place name of `level`'s rows.
pub fn name_column(level: Level) -> &'static str {
    match level {
        Level::State => "state_name",
        Level::County => "county_name",
        Level::Zcta5 => "zcta5",
    }
}

fn name_header(level: Level) -> &'static str {
    match level {
        Level::State => "State",
        Level::County => "County",
        Level::Zcta5 => "ZIP Code",
    }
}

pub fn datasets_grid(manifest: &Manifest) -> Grid {
    Grid {
        headers: vec!["Dataset".into(), "Name".into(), "Description".into()],
        rows: manifest
            .datasets
            .iter()
            .map(|entry| {
                vec![
                    entry.handle().to_string(),
                    entry.display_name(),
                    entry.description.clone().unwrap_or_else(|| "-".into()),
                ]
            })
            .collect(),
        numeric: Vec::new(),
    }
}

/// Place name, population, metric, change and land area of each row.
///
/// Optional columns only appear when the table has them.
pub fn rows_grid(view: &RowsView<'_>, rows: &[Row]) -> Grid {
    let columns = rows.first().map(Row::columns).unwrap_or_default();
    let has = |column: &str| columns.iter().any(|c| c == column);

    let population = population_column(columns)
        .filter(|column| Some(*column) != view.metric)
        .map(str::to_string);
    let metric = view.metric.filter(|m| has(m));
    let previous = metric
        .zip(view.compare_year)
        .and_then(|(metric, year)| column_for_year(metric, year))
        .filter(|column| has(column));
    let land_area = has(LAND_AREA_COLUMN);

    let mut grid = Grid::default();
    grid.headers.push(name_header(view.level).into());
    if population.is_some() {
        grid.numeric.push(grid.headers.len());
        grid.headers.push("Population".into());
    }
    if let Some(metric) = metric {
        grid.numeric.push(grid.headers.len());
        grid.headers.push(metric_label(metric));
    }
    if let (Some(_), Some(year)) = (&previous, view.compare_year) {
        grid.numeric.push(grid.headers.len());
        grid.headers.push(format!("Change vs {year}"));
    }
    if land_area {
        grid.numeric.push(grid.headers.len());
        grid.headers.push("Land Area (km²)".into());
    }

    let shown = if view.limit == 0 { rows.len() } else { view.limit };
    for row in rows.iter().take(shown) {
        let cell = |column: &str| row.get(column).cloned().unwrap_or(CellValue::Null);
        let mut line = vec![place_name(&cell(name_column(view.level)))];
        if let Some(population) = &population {
            line.push(format_value(&cell(population)));
        }
        if let Some(metric) = metric {
            line.push(format_value(&cell(metric)));
            if let Some(previous) = &previous {
                line.push(format_change(&cell(metric), &cell(previous)));
            }
        }
        if land_area {
            line.push(format_area(&cell(LAND_AREA_COLUMN)));
        }
        grid.rows.push(line);
    }
    grid
}

/// Every applicable dimension with its options and how much is selected.
pub fn options_grid(options: &AvailableOptions, filters: &FilterState) -> Grid {
    let rows = options
        .iter()
        .map(|(dimension, available)| {
            let selected = filters.selection(dimension);
            let state = if available.is_empty() {
                "-".to_string()
            } else if is_restricting(selected, available) {
                format!("{} of {}", selected.len(), available.len())
            } else {
                "all".to_string()
            };
            vec![
                dimension.label().to_string(),
                available.join(", "),
                state,
            ]
        })
        .collect();
    Grid {
        headers: vec!["Filter".into(), "Options".into(), "Selected".into()],
        rows,
        numeric: vec![2],
    }
}

/// `Showing 3 of 254 Counties`, with the active filter count when any.
pub fn showing_line(level: Level, shown: usize, total: usize, active_filters: usize) -> String {
    let mut line = format!("Showing {shown} of {total} {}", level.plural());
    if active_filters > 0 {
        let noun = if active_filters == 1 { "filter" } else { "filters" };
        line.push_str(&format!(" ({active_filters} active {noun})"));
    }
    line
}

/// Names and codes are printed as stored, never grouped like numbers.
fn place_name(value: &CellValue) -> String {
    value
        .as_text()
        .map_or_else(|| census_model::NOT_AVAILABLE.to_string(), Cow::into_owned)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: &str) -> Cell {
    if value == census_model::NOT_AVAILABLE || value == "-" {
        Cell::new(value).add_attribute(Attribute::Dim)
    } else if value.starts_with('+') {
        Cell::new(value).fg(Color::Green)
    } else if value.starts_with('-') && value.len() > 1 {
        Cell::new(value).fg(Color::Red)
    } else {
        Cell::new(value)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH);
}
