//! Parsed rows and their shared column schema.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::value::CellValue;

/// An immutable, shared sequence of rows.
///
/// Cached tables are handed out as `Rows` so repeated lookups return the
/// same allocation.
pub type Rows = Arc<[Row]>;

/// Column names of one table, shared by every row parsed from it.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema; for duplicated names the first occurrence wins.
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        Self { columns, index }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

/// One record: an ordered mapping from column name to cell value.
///
/// Cloning a row is cheap; schema and cells are reference counted.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<Schema>,
    cells: Arc<[CellValue]>,
}

impl Row {
    /// Create a row, padding missing trailing cells with `Null` and
    /// dropping cells beyond the schema width.
    pub fn new(schema: Arc<Schema>, mut cells: Vec<CellValue>) -> Self {
        cells.resize(schema.len(), CellValue::Null);
        Self {
            schema,
            cells: cells.into(),
        }
    }

    /// Build a standalone row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let (columns, cells): (Vec<String>, Vec<CellValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(Arc::new(Schema::new(columns)), cells)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// Cell for `column`, `None` when the column is absent from the schema.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.schema.position(column).map(|i| &self.cells[i])
    }

    /// Non-blank text of `column`.
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).and_then(CellValue::as_text)
    }

    /// Lenient numeric value of `column` (absent or non-numeric is `0.0`).
    pub fn number(&self, column: &str) -> f64 {
        self.get(column).map_or(0.0, CellValue::number_or_zero)
    }

    /// Returns true when `column` holds exactly `expected` as text.
    pub fn text_eq(&self, column: &str, expected: &str) -> bool {
        self.text(column).is_some_and(|v| v == expected)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.cells == other.cells
    }
}
