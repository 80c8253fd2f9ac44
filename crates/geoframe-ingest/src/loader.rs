//! CSV source loading.
//!
//! Every declared column is read as text and then parsed to the kind its
//! [`Field`] declares. Empty cells are null, and so are `NaN` or infinite
//! numeric cells. Columns the descriptor does not
//! declare are dropped.

use std::time::Instant;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::{debug, info};

use geoframe_common::{date_series, date_to_days, parse_bool, parse_date, parse_f64, parse_i64};
use geoframe_model::columns::REGION_NAME;
use geoframe_model::{Field, FieldKind, PipelineError, Result, SourceDescriptor};

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `NaN` and infinities read as missing, like blank cells.
fn is_non_finite(text: &str) -> bool {
    parse_f64(text).is_some_and(|value| !value.is_finite())
}

/// Declared columns as raw text, in declaration order.
struct RawColumns {
    values: Vec<Vec<Option<String>>>,
    rows: usize,
}

fn read_raw(source: &SourceDescriptor) -> Result<RawColumns> {
    let path = &source.location;
    let load_error = |message: String| PipelineError::source_load(&source.name, path, message);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| load_error(format!("cannot open file: {e}")))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| load_error(format!("cannot read header row: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut indices = Vec::with_capacity(source.fields.len());
    for field in &source.fields {
        let index = headers
            .iter()
            .position(|header| *header == field.name)
            .ok_or_else(|| load_error(format!("declared column '{}' is missing", field.name)))?;
        indices.push(index);
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); indices.len()];
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| load_error(format!("cannot read record: {e}")))?;
        for (column, &index) in values.iter_mut().zip(&indices) {
            column.push(record.get(index).and_then(normalize_cell));
        }
        rows += 1;
    }
    Ok(RawColumns { values, rows })
}

fn parse_column(
    source: &SourceDescriptor,
    field: &Field,
    raw: Vec<Option<String>>,
) -> Result<Series> {
    let name = field.name.as_str();
    let parse_failure = |row: usize, value: &str| {
        PipelineError::coercion(
            name,
            field.kind.as_str(),
            format!(
                "source '{}' row {}: cannot parse '{value}'",
                source.name,
                row + 1
            ),
        )
    };

    let series = match &field.kind {
        FieldKind::Date => {
            let mut days = Vec::with_capacity(raw.len());
            for (row, value) in raw.iter().enumerate() {
                days.push(match value {
                    Some(text) => Some(
                        parse_date(text)
                            .map(date_to_days)
                            .ok_or_else(|| parse_failure(row, text))?,
                    ),
                    None => None,
                });
            }
            date_series(name, days)?
        }
        FieldKind::Ordinal { .. } => {
            let mut parsed = Vec::with_capacity(raw.len());
            for (row, value) in raw.iter().enumerate() {
                parsed.push(match value {
                    Some(text) if is_non_finite(text) => None,
                    Some(text) => Some(parse_i64(text).ok_or_else(|| parse_failure(row, text))?),
                    None => None,
                });
            }
            Series::new(name.into(), parsed)
        }
        FieldKind::Numeric { .. } => {
            let mut parsed = Vec::with_capacity(raw.len());
            for (row, value) in raw.iter().enumerate() {
                parsed.push(match value {
                    Some(text) if is_non_finite(text) => None,
                    Some(text) => Some(parse_f64(text).ok_or_else(|| parse_failure(row, text))?),
                    None => None,
                });
            }
            Series::new(name.into(), parsed)
        }
        FieldKind::Boolean => {
            let mut parsed = Vec::with_capacity(raw.len());
            for (row, value) in raw.iter().enumerate() {
                parsed.push(match value {
                    Some(text) => Some(parse_bool(text).ok_or_else(|| parse_failure(row, text))?),
                    None => None,
                });
            }
            Series::new(name.into(), parsed)
        }
        FieldKind::Nominal if name == REGION_NAME => {
            // Null region means the row describes the whole country.
            let filled: Vec<String> = raw.into_iter().map(Option::unwrap_or_default).collect();
            Series::new(name.into(), filled)
        }
        FieldKind::Nominal => Series::new(name.into(), raw),
    };
    Ok(series)
}

/// Read `source` into a DataFrame holding exactly its declared columns.
///
/// # Errors
///
/// [`PipelineError::SourceLoad`] when the file is unreadable or lacks a
/// declared column; [`PipelineError::TypeCoercion`] when a cell cannot be
/// parsed to its declared kind.
pub fn read_source(source: &SourceDescriptor) -> Result<DataFrame> {
    let started = Instant::now();
    let raw = read_raw(source)?;
    let rows = raw.rows;

    let mut columns: Vec<Column> = Vec::with_capacity(source.fields.len());
    for (field, values) in source.fields.iter().zip(raw.values) {
        let series = parse_column(source, field, values)?;
        debug!(
            source = %source.name,
            column = %field.name,
            kind = %field.kind,
            null_count = series.null_count(),
            "parsed column"
        );
        columns.push(series.into());
    }
    let df = DataFrame::new(columns)?;

    info!(
        source = %source.name,
        path = %source.location.display(),
        rows,
        columns = df.width(),
        duration_ms = started.elapsed().as_millis(),
        "source loaded"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_strips_bom() {
        assert_eq!(normalize_header("\u{feff}date "), "date");
    }

    #[test]
    fn non_finite_text_is_detected() {
        assert!(is_non_finite("NaN"));
        assert!(is_non_finite("-inf"));
        assert!(!is_non_finite("0.5"));
        assert!(!is_non_finite("NA"));
    }

    #[test]
    fn blank_cells_are_null() {
        assert_eq!(normalize_cell("   "), None);
        assert_eq!(normalize_cell(" NA "), Some("NA".to_string()));
    }
}
