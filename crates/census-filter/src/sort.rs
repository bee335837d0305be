//! Column sorting of result rows.

use std::cmp::Ordering;

use census_model::{CellValue, Rows};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Sort column and direction of the results table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    column: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some()
    }

    /// Clicking a header: the same column flips direction, a new column
    /// starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Stable sort of `rows`; unsorted state returns the input unchanged.
    pub fn apply(&self, rows: &Rows) -> Rows {
        let Some(column) = self.column.as_deref() else {
            return Rows::clone(rows);
        };
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| {
            let ordering = compare_cells(a.get(column), b.get(column));
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        Rows::from(sorted)
    }
}

/// Numbers compare numerically; anything else compares as lowercase text.
pub fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    if let (Some(CellValue::Number(x)), Some(CellValue::Number(y))) = (a, b) {
        return x.total_cmp(y);
    }
    sort_text(a).cmp(&sort_text(b))
}

fn sort_text(cell: Option<&CellValue>) -> String {
    cell.and_then(CellValue::as_text)
        .map(|text| text.to_lowercase())
        .unwrap_or_default()
}
