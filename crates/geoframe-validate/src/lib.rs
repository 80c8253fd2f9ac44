//! Final schema enforcement for geoframe tables.
//!
//! [`validate_table`] rejects tables that break the schema; [`coerce_table`]
//! casts every schema column to the dtype of its kind and orders columns by
//! name.

mod checks;
mod coerce;

use polars::prelude::DataFrame;
use tracing::info;

use geoframe_model::{Result, Schema};

/// Check every schema column for presence, nulls, NaN and static bounds.
///
/// # Errors
///
/// The first [`geoframe_model::PipelineError::Validation`] found, in schema
/// order.
pub fn validate_table(df: &DataFrame, schema: &Schema) -> Result<()> {
    for field in schema {
        checks::check_present(df, field)?;
        checks::check_nulls(df, field)?;
        checks::check_finite(df, field)?;
        checks::check_bounds(df, field)?;
    }
    info!(
        columns = schema.len(),
        rows = df.height(),
        "table validated"
    );
    Ok(())
}

/// Cast schema columns to their kind's dtype and sort columns by name.
///
/// Ordinal values must be integral. Columns outside the schema are kept.
///
/// # Errors
///
/// [`geoframe_model::PipelineError::TypeCoercion`] when a value cannot be
/// represented in the target dtype.
pub fn coerce_table(mut df: DataFrame, schema: &Schema) -> Result<DataFrame> {
    for field in schema {
        if df.get_column_index(&field.name).is_none() {
            continue;
        }
        let coerced = coerce::coerce_column(&df, field)?;
        df.with_column(coerced)?;
    }
    let mut names: Vec<String> = df
        .get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    names.sort();
    Ok(df.select(names)?)
}

/// [`validate_table`] followed by [`coerce_table`].
pub fn validate_and_coerce(df: DataFrame, schema: &Schema) -> Result<DataFrame> {
    validate_table(&df, schema)?;
    coerce_table(df, schema)
}
