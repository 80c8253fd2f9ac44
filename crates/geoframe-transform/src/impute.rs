//! Imputation engine.
//!
//! Each field carries an ordered cascade of [`Imputation`] rules. A rule
//! partitions the rows by its key columns, computes one fill value per group
//! from the group's non-null cells and writes it into the group's null cells.
//! Later rules only see the nulls earlier rules could not fill, so a cascade
//! typically runs from the narrowest grouping to a global fallback.
//!
//! Group fills are computed on the rayon pool and applied afterwards in group
//! order, so results never depend on scheduling.

use std::collections::HashMap;

use polars::prelude::{DataFrame, IntoSeries, NamedFrom, Series};
use rayon::prelude::*;
use tracing::{debug, info};

use geoframe_common::{
    column_bool, column_days, column_f64, column_i64, column_text, date_series, null_count,
};
use geoframe_model::columns::{DATE, missing_indicator_name};
use geoframe_model::{Field, FieldKind, FillStrategy, Imputation, PipelineError, Result};

use crate::keys::row_keys;

/// Rows partitioned by a rule's key columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    /// Row indices per group, in first-seen order; rows inside a group follow
    /// the order the index was built with.
    pub groups: Vec<Vec<usize>>,
    /// Rows left out because a key component is null.
    pub skipped: usize,
}

impl GroupIndex {
    /// Group the rows listed in `order` by `keys`. No keys means one group.
    pub fn build(df: &DataFrame, keys: &[String], order: &[usize]) -> Result<Self> {
        if keys.is_empty() {
            return Ok(Self {
                groups: vec![order.to_vec()],
                skipped: 0,
            });
        }
        let columns: Vec<&str> = keys.iter().map(String::as_str).collect();
        let row_keys = row_keys(df, &columns)?;

        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut index = Self::default();
        for &row in order {
            let Some(key) = row_keys[row].as_deref() else {
                index.skipped += 1;
                continue;
            };
            let position = *positions.entry(key).or_insert_with(|| {
                index.groups.push(Vec::new());
                index.groups.len() - 1
            });
            index.groups[position].push(row);
        }
        Ok(index)
    }
}

/// Row indices sorted by `date` (nulls last), or table order without one.
pub fn date_order(df: &DataFrame) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..df.height()).collect();
    if df.get_column_index(DATE).is_some() {
        let days = column_days(df, DATE)?;
        order.sort_by_key(|&row| (days[row].is_none(), days[row]));
    }
    Ok(order)
}

/// Column values in the representation their kind is imputed in.
enum Cells {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
    Days(Vec<Option<i32>>),
}

impl Cells {
    fn read(df: &DataFrame, field: &Field) -> Result<Self> {
        let name = field.name.as_str();
        Ok(match field.kind {
            FieldKind::Date => Self::Days(column_days(df, name)?),
            FieldKind::Ordinal { .. } => Self::Int(column_i64(df, name)?),
            FieldKind::Numeric { .. } => Self::Float(column_f64(df, name)?),
            FieldKind::Nominal => Self::Text(column_text(df, name)?),
            FieldKind::Boolean => Self::Bool(column_bool(df, name)?),
        })
    }

    fn null_count(&self) -> usize {
        fn nulls<T>(values: &[Option<T>]) -> usize {
            values.iter().filter(|value| value.is_none()).count()
        }
        match self {
            Self::Float(values) => nulls(values),
            Self::Int(values) => nulls(values),
            Self::Bool(values) => nulls(values),
            Self::Text(values) => nulls(values),
            Self::Days(values) => nulls(values),
        }
    }

    /// Apply one strategy over `groups`; returns the number of cells filled.
    fn fill(&mut self, strategy: FillStrategy, groups: &[Vec<usize>]) -> usize {
        match self {
            Self::Float(values) => apply(values, groups, strategy, float_fill),
            Self::Int(values) => apply(values, groups, strategy, int_fill),
            Self::Bool(values) => apply(values, groups, strategy, bool_fill),
            Self::Text(values) => apply(values, groups, strategy, ordered_fill),
            Self::Days(values) => apply(values, groups, strategy, ordered_fill),
        }
    }

    fn into_series(self, name: &str) -> Result<Series> {
        Ok(match self {
            Self::Float(values) => Series::new(name.into(), values),
            Self::Int(values) => Series::new(name.into(), values),
            Self::Bool(values) => Series::new(name.into(), values),
            Self::Text(values) => Series::new(name.into(), values),
            Self::Days(values) => date_series(name, values)?,
        })
    }
}

fn apply<T, F>(
    values: &mut [Option<T>],
    groups: &[Vec<usize>],
    strategy: FillStrategy,
    aggregate: F,
) -> usize
where
    T: Clone + Send + Sync,
    F: Fn(FillStrategy, &[&T]) -> Option<T> + Sync,
{
    match strategy {
        FillStrategy::ForwardFill => forward_fill(values, groups),
        _ => fill_by_group(values, groups, |present| aggregate(strategy, present)),
    }
}

fn fill_by_group<T, F>(values: &mut [Option<T>], groups: &[Vec<usize>], aggregate: F) -> usize
where
    T: Clone + Send + Sync,
    F: Fn(&[&T]) -> Option<T> + Sync,
{
    let snapshot: &[Option<T>] = &*values;
    let fills: Vec<Option<T>> = groups
        .par_iter()
        .map(|rows| {
            if rows.iter().all(|&row| snapshot[row].is_some()) {
                return None;
            }
            let present: Vec<&T> = rows
                .iter()
                .filter_map(|&row| snapshot[row].as_ref())
                .collect();
            aggregate(&present)
        })
        .collect();

    let mut filled = 0;
    for (rows, fill) in groups.iter().zip(fills) {
        let Some(fill) = fill else {
            continue;
        };
        for &row in rows {
            if values[row].is_none() {
                values[row] = Some(fill.clone());
                filled += 1;
            }
        }
    }
    filled
}

fn forward_fill<T>(values: &mut [Option<T>], groups: &[Vec<usize>]) -> usize
where
    T: Clone + Send + Sync,
{
    let snapshot: &[Option<T>] = &*values;
    let assignments: Vec<Vec<(usize, T)>> = groups
        .par_iter()
        .map(|rows| {
            let mut last: Option<&T> = None;
            let mut carried = Vec::new();
            for &row in rows {
                match &snapshot[row] {
                    Some(value) => last = Some(value),
                    None => {
                        if let Some(value) = last {
                            carried.push((row, value.clone()));
                        }
                    }
                }
            }
            carried
        })
        .collect();

    let mut filled = 0;
    for (row, value) in assignments.into_iter().flatten() {
        values[row] = Some(value);
        filled += 1;
    }
    filled
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// NaN and infinite cells never contribute to a fill value.
fn float_fill(strategy: FillStrategy, present: &[&f64]) -> Option<f64> {
    let values: Vec<f64> = present
        .iter()
        .map(|value| **value)
        .filter(|value| value.is_finite())
        .collect();
    match strategy {
        FillStrategy::Zero => Some(0.0),
        FillStrategy::Mean => mean(&values),
        FillStrategy::Median => median(values),
        FillStrategy::Min => values.into_iter().reduce(f64::min),
        FillStrategy::Max => values.into_iter().reduce(f64::max),
        FillStrategy::ForwardFill => None,
    }
}

/// Averages of integer columns round half away from zero.
fn int_fill(strategy: FillStrategy, present: &[&i64]) -> Option<i64> {
    let as_float: Vec<f64> = present.iter().map(|value| **value as f64).collect();
    match strategy {
        FillStrategy::Zero => Some(0),
        FillStrategy::Mean => mean(&as_float).map(|value| value.round() as i64),
        FillStrategy::Median => median(as_float).map(|value| value.round() as i64),
        FillStrategy::Min => present.iter().map(|value| **value).min(),
        FillStrategy::Max => present.iter().map(|value| **value).max(),
        FillStrategy::ForwardFill => None,
    }
}

fn bool_fill(strategy: FillStrategy, present: &[&bool]) -> Option<bool> {
    match strategy {
        FillStrategy::Zero => Some(false),
        FillStrategy::Min if !present.is_empty() => Some(present.iter().all(|value| **value)),
        FillStrategy::Max if !present.is_empty() => Some(present.iter().any(|value| **value)),
        _ => None,
    }
}

/// Min/max for kinds without arithmetic (text, dates).
fn ordered_fill<T: Ord + Clone>(strategy: FillStrategy, present: &[&T]) -> Option<T> {
    match strategy {
        FillStrategy::Min => present.iter().min().map(|value| (*value).clone()),
        FillStrategy::Max => present.iter().max().map(|value| (*value).clone()),
        _ => None,
    }
}

fn check_rule(df: &DataFrame, field: &Field, rule: &Imputation) -> Result<()> {
    if !rule.strategy.supports(&field.kind) {
        return Err(PipelineError::imputation(
            &field.name,
            format!("{} cannot fill a {} column", rule.strategy, field.kind),
        ));
    }
    if let Some(missing) = rule
        .keys
        .iter()
        .find(|key| df.get_column_index(key).is_none())
    {
        return Err(PipelineError::imputation(
            &field.name,
            format!("grouping key '{missing}' is not in the table"),
        ));
    }
    Ok(())
}

fn impute_field(df: &mut DataFrame, field: &Field, order: &[usize]) -> Result<()> {
    let name = field.name.as_str();
    if df.get_column_index(name).is_none() {
        return Err(PipelineError::imputation(name, "column is not in the table"));
    }
    for rule in &field.imputations {
        check_rule(df, field, rule)?;
    }

    let mut cells = Cells::read(df, field)?;
    let initial = cells.null_count();
    if initial == 0 {
        return Ok(());
    }
    let mut remaining = initial;
    for rule in &field.imputations {
        if remaining == 0 {
            break;
        }
        let index = GroupIndex::build(df, &rule.keys, order)?;
        let filled = cells.fill(rule.strategy, &index.groups);
        remaining -= filled;
        debug!(
            column = name,
            rule = %rule,
            groups = index.groups.len(),
            skipped_rows = index.skipped,
            filled,
            remaining,
            "applied imputation rule"
        );
    }
    df.with_column(cells.into_series(name)?)?;
    info!(
        column = name,
        filled = initial - remaining,
        remaining,
        "imputed column"
    );
    Ok(())
}

/// Add `<field>_missing` columns for fields that request them.
///
/// Indicators reflect nullness at the time of the call, so this must run
/// before [`impute_fields`]. An indicator column that already exists is left
/// untouched. Returns the indicator fields that were added.
pub fn mark_missing(df: &mut DataFrame, fields: &[Field]) -> Result<Vec<Field>> {
    let mut added = Vec::new();
    for field in fields.iter().filter(|field| field.mark_missing) {
        let indicator = missing_indicator_name(&field.name);
        if df.get_column_index(&indicator).is_some() {
            continue;
        }
        let column = df
            .column(&field.name)
            .map_err(|_| PipelineError::imputation(&field.name, "column is not in the table"))?;
        debug!(
            column = %field.name,
            indicator = %indicator,
            missing = column.null_count(),
            "added missing indicator"
        );
        let flags = column
            .as_materialized_series()
            .is_null()
            .into_series()
            .with_name(indicator.as_str().into());
        df.with_column(flags)?;
        added.push(Field::boolean(indicator));
    }
    Ok(added)
}

/// Run the imputation cascade of every field, in declaration order.
///
/// Nulls that survive all rules are left in place; see [`ensure_imputed`].
///
/// # Errors
///
/// [`PipelineError::Imputation`] when a field's column or a rule's grouping
/// key is absent, or a strategy cannot produce values of the field's kind.
pub fn impute_fields(df: &mut DataFrame, fields: &[Field]) -> Result<()> {
    let order = date_order(df)?;
    for field in fields.iter().filter(|field| field.has_imputations()) {
        impute_field(df, field, &order)?;
    }
    Ok(())
}

/// Fail if any field with imputation rules still holds nulls.
pub fn ensure_imputed(df: &DataFrame, fields: &[Field]) -> Result<()> {
    for field in fields.iter().filter(|field| field.has_imputations()) {
        let remaining = null_count(df, &field.name)?;
        if remaining > 0 {
            return Err(PipelineError::ImputationExhaustion {
                column: field.name.clone(),
                remaining,
            });
        }
    }
    Ok(())
}
