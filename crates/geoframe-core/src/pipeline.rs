//! End-to-end assembly of the daily geo table.
//!
//! `load` runs, per source: read, expand to daily rows, join onto the
//! accumulated table, impute the new columns, then trim. The geo source goes
//! first and fixes the row universe: one row per day of the range and geo
//! entity.

use std::time::Instant;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use tracing::{debug, info, warn};

use geoframe_common::{column_days, column_text, days_to_date};
use geoframe_ingest::read_source;
use geoframe_model::columns::DATE;
use geoframe_model::{DateRange, Field, Result, Schema, SourceDescriptor};
use geoframe_transform::{
    JoinMode, RowOrigin, add_calendar_columns, add_geo_code, ensure_imputed, expand_source,
    impute_fields, mark_missing, merge_source, resolve_geo_keys, resolve_join_keys,
};
use geoframe_validate::validate_and_coerce;

use crate::options::LoadOptions;

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Keep rows whose date lies in `range` and, when given, whose origin passes.
fn trim(
    source_name: &str,
    df: &DataFrame,
    range: &DateRange,
    origins: Option<&[RowOrigin]>,
) -> Result<DataFrame> {
    let days = column_days(df, DATE)?;
    let mut outside = 0usize;
    let mut purged = 0usize;
    let keep: Vec<bool> = days
        .iter()
        .enumerate()
        .map(|(row, day)| {
            let in_range = day
                .and_then(days_to_date)
                .is_some_and(|date| range.contains(date));
            if !in_range {
                outside += 1;
                return false;
            }
            if origins.is_some_and(|origins| origins[row] == RowOrigin::IncomingOnly) {
                purged += 1;
                return false;
            }
            true
        })
        .collect();
    if outside + purged == 0 {
        return Ok(df.clone());
    }
    if purged > 0 {
        warn!(
            source = source_name,
            rows = purged,
            "dropped rows for geo entities the geo source does not define"
        );
    }
    debug!(source = source_name, rows = outside, "dropped rows outside the date range");
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Drop geo rows without an entity; they cannot be joined or coded.
fn drop_unidentified(source_name: &str, df: DataFrame, entity: &str) -> Result<DataFrame> {
    let keep: Vec<bool> = column_text(&df, entity)?
        .iter()
        .map(Option::is_some)
        .collect();
    let dropped = keep.iter().filter(|keep| !**keep).count();
    if dropped == 0 {
        return Ok(df);
    }
    warn!(
        source = source_name,
        column = entity,
        rows = dropped,
        "dropped geo rows without an entity"
    );
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Fields newly declared by this source, with the schema's declaration.
fn declare(schema: &mut Schema, fields: &[Field]) -> Vec<Field> {
    schema
        .extend(fields.iter().cloned())
        .iter()
        .filter_map(|name| schema.get(name).cloned())
        .collect()
}

/// Read and expand the geo source, then derive calendar and `geo_code` columns.
fn load_geo(range: &DateRange, geo: &SourceDescriptor) -> Result<(DataFrame, Schema)> {
    let mut schema: Schema = geo.fields.iter().cloned().collect();
    let raw = read_source(geo)?;
    let expanded = expand_source(&geo.name, &raw, range)?;
    let mut table = trim(&geo.name, &expanded, range, None)?;

    let keys = resolve_geo_keys(&column_names(&table));
    if let Some(entity) = keys.entity.as_deref() {
        table = drop_unidentified(&geo.name, table, entity)?;
    }

    schema.insert(Field::date(DATE));
    let calendar = add_calendar_columns(&mut table)?;
    schema.extend(calendar);

    if let Some(field) = add_geo_code(&mut table, &keys)? {
        schema.insert(field);
    }

    let own: Vec<Field> = geo.fields.clone();
    schema.extend(mark_missing(&mut table, &own)?);
    impute_fields(&mut table, &own)?;
    ensure_imputed(&table, &own)?;

    info!(
        source = %geo.name,
        rows = table.height(),
        columns = table.width(),
        keys = %keys,
        "geo table ready"
    );
    Ok((table, schema))
}

/// Join one feature source onto `table` and impute its columns.
fn merge_feature(
    range: &DateRange,
    table: DataFrame,
    schema: &mut Schema,
    source: &SourceDescriptor,
    options: &LoadOptions,
) -> Result<DataFrame> {
    let started = Instant::now();
    let raw = read_source(source)?;
    let incoming = expand_source(&source.name, &raw, range)?;
    let keys = resolve_join_keys(&source.name, &column_names(&table), &column_names(&incoming))?;
    let outcome = merge_source(&source.name, &table, &incoming, &keys, options.join)?;

    let fields = declare(schema, &source.fields);
    let mut merged = outcome.table;
    schema.extend(mark_missing(&mut merged, &fields)?);
    impute_fields(&mut merged, &fields)?;

    let origins = (options.join == JoinMode::Outer && options.purge_unmatched)
        .then_some(outcome.origins.as_slice());
    let trimmed = trim(&source.name, &merged, range, origins)?;
    ensure_imputed(&trimmed, &fields)?;

    info!(
        source = %source.name,
        keys = %keys,
        new_columns = fields.len(),
        rows = trimmed.height(),
        duration_ms = started.elapsed().as_millis(),
        "source merged"
    );
    Ok(trimmed)
}

/// Build the validated daily table for `range`.
///
/// The geo source defines the rows; each feature source in order contributes
/// columns. Returns the table with columns sorted by name, and the schema of
/// every column in it.
///
/// # Errors
///
/// Any [`geoframe_model::PipelineError`]; no partial table is returned.
pub fn load(
    range: &DateRange,
    geo: &SourceDescriptor,
    sources: &[SourceDescriptor],
    options: &LoadOptions,
) -> Result<(DataFrame, Schema)> {
    let started = Instant::now();
    info!(
        start = %range.start(),
        end = %range.end(),
        sources = sources.len(),
        join = ?options.join,
        "loading"
    );

    let (mut table, mut schema) = load_geo(range, geo)?;
    for source in sources {
        table = merge_feature(range, table, &mut schema, source, options)?;
    }
    let table = validate_and_coerce(table, &schema)?;

    info!(
        rows = table.height(),
        columns = table.width(),
        duration_ms = started.elapsed().as_millis(),
        "load complete"
    );
    Ok((table, schema))
}

/// Re-run missing indicators and every imputation cascade in `schema`.
///
/// A table whose columns are already complete comes back unchanged, so
/// applying this to the output of [`load`] is a no-op.
///
/// # Errors
///
/// [`geoframe_model::PipelineError::Imputation`] for an unusable rule and
/// [`geoframe_model::PipelineError::ImputationExhaustion`] when nulls remain.
pub fn impute(mut table: DataFrame, schema: &Schema) -> Result<(DataFrame, Schema)> {
    let fields: Vec<Field> = schema.iter().cloned().collect();
    let mut schema = schema.clone();
    schema.extend(mark_missing(&mut table, &fields)?);
    impute_fields(&mut table, &fields)?;
    ensure_imputed(&table, &fields)?;
    Ok((table, schema))
}
