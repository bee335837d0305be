//! CSV text to rows, with per-cell type inference.
//!
//! The first record is the header. Blank lines are skipped. Cells are typed
//! individually: empty cells become [`CellValue::Null`], `true`/`false`
//! become booleans, numeric text becomes a number unless it is an integer
//! with a leading zero (ZCTA and FIPS codes such as `01001` stay text).

use std::sync::Arc;
use std::sync::LazyLock;

use census_model::{CellValue, Row, Schema};
use regex::Regex;

use crate::error::{IngestError, Result};
use crate::progress::{PROGRESS_INTERVAL, ParseProgress};

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?$").expect("Invalid numeric regex")
});

/// Parse CSV text into rows.
pub fn parse_rows(text: &str) -> Result<Vec<Row>> {
    parse_rows_with_progress(text, |_| {})
}

/// Parse CSV text into rows, reporting progress every
/// [`PROGRESS_INTERVAL`] rows and once more on completion.
///
/// Fails with [`IngestError::EmptyText`] for blank input and with
/// [`IngestError::NoData`] when the header is not followed by any row.
pub fn parse_rows_with_progress<F>(text: &str, mut on_progress: F) -> Result<Vec<Row>>
where
    F: FnMut(ParseProgress),
{
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(IngestError::EmptyText);
    }

    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    let estimated_total = lines.saturating_sub(1).max(1);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(parse_error)?;
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let schema = Arc::new(Schema::new(columns));

    let mut rows = Vec::with_capacity(estimated_total);
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let cells = record.iter().map(infer_cell).collect();
        rows.push(Row::new(Arc::clone(&schema), cells));

        if rows.len() % PROGRESS_INTERVAL == 0 {
            on_progress(ParseProgress::parsing(rows.len(), estimated_total));
        }
    }

    if rows.is_empty() {
        tracing::warn!(lines, "CSV text contained no data rows");
        return Err(IngestError::NoData { lines });
    }

    on_progress(ParseProgress::complete(rows.len()));
    tracing::debug!(rows = rows.len(), columns = schema.len(), "parsed CSV text");
    Ok(rows)
}

/// Infer the scalar type of one raw field.
pub fn infer_cell(raw: &str) -> CellValue {
    let value = raw.trim();
    if value.is_empty() {
        return CellValue::Null;
    }
    match value {
        "true" | "TRUE" => return CellValue::Bool(true),
        "false" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }
    if NUMERIC.is_match(value)
        && !has_leading_zero(value)
        && let Ok(number) = value.parse::<f64>()
        && number.is_finite()
    {
        return CellValue::Number(number);
    }
    CellValue::Text(value.to_string())
}

/// `01001` or `-007` but not `0`, `0.5` or `0e3`.
fn has_leading_zero(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value).as_bytes();
    digits.len() > 1 && digits[0] == b'0' && digits[1].is_ascii_digit()
}

fn parse_error(err: csv::Error) -> IngestError {
    let line = err.position().map_or(0, csv::Position::line);
    IngestError::Parse { line, source: err }
}
