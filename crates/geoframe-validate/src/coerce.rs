//! Casting validated columns to the dtype their kind requires.

use polars::prelude::{DataFrame, NamedFrom, Series};

use geoframe_common::{column_f64, format_numeric, integral_f64};
use geoframe_model::{Field, FieldKind, PipelineError, Result};

fn to_int64(df: &DataFrame, field: &Field) -> Result<Series> {
    let values = column_f64(df, &field.name)?;
    let mut integers = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        integers.push(match value {
            Some(value) => Some(integral_f64(value).ok_or_else(|| {
                PipelineError::coercion(
                    &field.name,
                    "int64",
                    format!("row {}: {} is not integral", row + 1, format_numeric(value)),
                )
            })?),
            None => None,
        });
    }
    Ok(Series::new(field.name.as_str().into(), integers))
}

/// The column for `field` cast to its kind's dtype.
pub(crate) fn coerce_column(df: &DataFrame, field: &Field) -> Result<Series> {
    let target = field.kind.dtype();
    let series = df.column(&field.name)?.as_materialized_series();
    if series.dtype() == &target {
        return Ok(series.clone());
    }
    match field.kind {
        FieldKind::Ordinal { .. } => to_int64(df, field),
        _ => series.strict_cast(&target).map_err(|e| {
            PipelineError::coercion(&field.name, target.to_string(), e.to_string())
        }),
    }
}
