//! Temporal expansion.
//!
//! A source either carries an explicit `date` column or describes the days
//! it applies to with partial-time columns (`year`, `month`, `week`, ...).
//! Expansion turns the latter into one row per concrete matching day of the
//! requested [`DateRange`].

use std::collections::HashMap;

use chrono::NaiveDate;
use polars::prelude::{DataFrame, IdxCa, IdxSize};
use tracing::{debug, info};

use geoframe_common::{
    column_days, column_f64, date_series, date_to_days, days_to_date, integral_f64,
};
use geoframe_model::columns::{DATE, PARTIAL_TIME_COLUMNS};
use geoframe_model::{DateRange, PipelineError, Result};

use crate::calendar::CalendarField;

/// Conjunction of calendar-component equality tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DatePredicate {
    terms: Vec<(CalendarField, i64)>,
}

impl DatePredicate {
    /// Matches every date.
    pub fn always() -> Self {
        Self::default()
    }

    /// Also require `field` to equal `value`.
    #[must_use]
    pub fn and(mut self, field: CalendarField, value: i64) -> Self {
        self.terms.push((field, value));
        self
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        self.terms.iter().all(|&(field, value)| field.of(date) == value)
    }

    /// Matching days of `range`, ascending.
    pub fn matching_days(&self, range: &DateRange) -> Vec<NaiveDate> {
        range.days().filter(|day| self.matches(*day)).collect()
    }

    pub fn is_always(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Partial-time columns present in `df`, in canonical order.
pub fn partial_time_columns(df: &DataFrame) -> Vec<CalendarField> {
    PARTIAL_TIME_COLUMNS
        .iter()
        .filter(|name| df.get_column_index(name).is_some())
        .filter_map(|name| CalendarField::from_column(name))
        .collect()
}

/// Per-row predicates built from the partial-time columns.
///
/// `None` marks a row with a null (or non-integral) partial value; such a
/// row matches no date.
fn row_predicates(
    df: &DataFrame,
    fields: &[CalendarField],
) -> Result<Vec<Option<DatePredicate>>> {
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        columns.push(column_f64(df, field.column())?);
    }
    let predicates = (0..df.height())
        .map(|row| {
            fields
                .iter()
                .zip(&columns)
                .try_fold(DatePredicate::always(), |predicate, (field, values)| {
                    let value = values[row].and_then(integral_f64)?;
                    Some(predicate.and(*field, value))
                })
        })
        .collect();
    Ok(predicates)
}

/// Check that explicit dates agree with the partial-time columns beside them.
fn verify_explicit_dates(
    source_name: &str,
    df: &DataFrame,
    fields: &[CalendarField],
) -> Result<()> {
    let days = column_days(df, DATE)?;
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        columns.push(column_f64(df, field.column())?);
    }
    for (row, day) in days.iter().enumerate() {
        let Some(date) = day.and_then(days_to_date) else {
            continue;
        };
        for (field, values) in fields.iter().zip(&columns) {
            let Some(value) = values[row] else {
                continue;
            };
            let expected = field.of(date) as f64;
            if (value - expected).abs() > f64::EPSILON {
                return Err(PipelineError::ExpansionAmbiguity {
                    source_name: source_name.to_string(),
                    message: format!(
                        "row {}: date {date} has {} {}, but the row says {value}",
                        row + 1,
                        field.column(),
                        expected
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Give every row of `df` a concrete `date` within `range`.
///
/// Sources with an explicit `date` column pass through unchanged (after
/// checking any partial-time columns against it). Otherwise each row is
/// repeated once per matching day, preserving row order with days ascending
/// within a row. Without partial-time columns every row matches every day.
///
/// # Errors
///
/// [`PipelineError::ExpansionAmbiguity`] when an explicit date contradicts
/// the partial-time columns of its row.
pub fn expand_source(source_name: &str, df: &DataFrame, range: &DateRange) -> Result<DataFrame> {
    let fields = partial_time_columns(df);

    if df.get_column_index(DATE).is_some() {
        if !fields.is_empty() {
            verify_explicit_dates(source_name, df, &fields)?;
        }
        debug!(source = source_name, "explicit dates, no expansion");
        return Ok(df.clone());
    }

    let predicates = row_predicates(df, &fields)?;
    let mut cache: HashMap<DatePredicate, Vec<i32>> = HashMap::new();
    let mut take: Vec<IdxSize> = Vec::new();
    let mut days: Vec<Option<i32>> = Vec::new();
    let mut unmatched = 0usize;

    for (row, predicate) in predicates.into_iter().enumerate() {
        let Some(predicate) = predicate else {
            unmatched += 1;
            continue;
        };
        let matching = cache.entry(predicate).or_insert_with_key(|predicate| {
            predicate
                .matching_days(range)
                .into_iter()
                .map(date_to_days)
                .collect()
        });
        if matching.is_empty() {
            unmatched += 1;
        }
        for &day in matching.iter() {
            take.push(row as IdxSize);
            days.push(Some(day));
        }
    }

    let idx = IdxCa::from_vec("idx".into(), take);
    let mut expanded = df.take(&idx)?;
    expanded.with_column(date_series(DATE, days)?)?;

    info!(
        source = source_name,
        partial_columns = ?fields.iter().map(|field| field.column()).collect::<Vec<_>>(),
        input_rows = df.height(),
        output_rows = expanded.height(),
        unmatched_rows = unmatched,
        "expanded source to daily rows"
    );
    Ok(expanded)
}
