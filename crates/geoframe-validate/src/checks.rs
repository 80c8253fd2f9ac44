//! Schema checks on a finished table.
//!
//! A column is rejected when:
//! - it is declared but absent from the table
//! - it still contains a null, or a NaN / infinite float
//! - its extreme value violates a static bound

use polars::prelude::DataFrame;

use geoframe_common::{column_f64, format_numeric};
use geoframe_model::{Bound, Field, FieldKind, PipelineError, Result};

/// Observed `(min, max)` of the non-null values, if any.
fn extremes(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

pub(crate) fn check_present(df: &DataFrame, field: &Field) -> Result<()> {
    if df.get_column_index(&field.name).is_none() {
        return Err(PipelineError::validation(
            &field.name,
            "column missing from table",
        ));
    }
    Ok(())
}

pub(crate) fn check_nulls(df: &DataFrame, field: &Field) -> Result<()> {
    let nulls = df.column(&field.name)?.null_count();
    if nulls > 0 {
        return Err(PipelineError::validation(
            &field.name,
            format!("null values present ({nulls} row(s))"),
        ));
    }
    Ok(())
}

/// Float columns may not hold NaN or infinities; they escape range checks.
pub(crate) fn check_finite(df: &DataFrame, field: &Field) -> Result<()> {
    if !matches!(field.kind, FieldKind::Numeric { .. }) {
        return Ok(());
    }
    let non_finite = column_f64(df, &field.name)?
        .into_iter()
        .flatten()
        .filter(|value| !value.is_finite())
        .count();
    if non_finite > 0 {
        return Err(PipelineError::validation(
            &field.name,
            format!("non-finite values present ({non_finite} row(s))"),
        ));
    }
    Ok(())
}

/// Static bounds only; a bound taken from another column is not checked here.
pub(crate) fn check_bounds(df: &DataFrame, field: &Field) -> Result<()> {
    let (minimum, maximum) = field.kind.bounds();
    let minimum = minimum.and_then(Bound::static_value);
    let maximum = maximum.and_then(Bound::static_value);
    if minimum.is_none() && maximum.is_none() {
        return Ok(());
    }
    let Some((observed_min, observed_max)) = extremes(&column_f64(df, &field.name)?) else {
        return Ok(());
    };
    if let Some(maximum) = maximum
        && observed_max > maximum
    {
        return Err(PipelineError::validation(
            &field.name,
            format!(
                "out of bounds: maximum {} exceeds {}",
                format_numeric(observed_max),
                format_numeric(maximum)
            ),
        ));
    }
    if let Some(minimum) = minimum
        && observed_min < minimum
    {
        return Err(PipelineError::validation(
            &field.name,
            format!(
                "out of bounds: minimum {} is below {}",
                format_numeric(observed_min),
                format_numeric(minimum)
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_skip_nulls() {
        assert_eq!(extremes(&[None, Some(3.0), Some(-1.0)]), Some((-1.0, 3.0)));
        assert_eq!(extremes(&[None]), None);
    }
}
