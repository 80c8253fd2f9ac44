//! Joining a feature source onto the accumulated table.
//!
//! The join is an explicit hash join: incoming rows are indexed by their key
//! tuple, then every accumulated row looks its key up. Both sides are padded
//! with one all-null row so unmatched positions can be gathered with a plain
//! `take`.

use std::collections::HashMap;

use polars::prelude::{Column, DataFrame, IdxCa, IdxSize, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use geoframe_model::Result;

use crate::keys::{JoinKeys, row_keys};

/// Which rows survive a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// Keep exactly the accumulated rows.
    Left,
    /// Also admit rows only the incoming source has.
    #[default]
    Outer,
}

/// Where an output row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    Matched,
    ExistingOnly,
    IncomingOnly,
}

/// Result of [`merge_source`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: DataFrame,
    /// One entry per row of `table`.
    pub origins: Vec<RowOrigin>,
    /// Incoming columns appended to the table.
    pub added_columns: Vec<String>,
    /// Incoming columns dropped because the table already had them.
    pub dropped_columns: Vec<String>,
}

impl MergeOutcome {
    pub fn count(&self, origin: RowOrigin) -> usize {
        self.origins.iter().filter(|o| **o == origin).count()
    }
}

/// `df` with one extra row of nulls appended.
fn with_null_row(df: &DataFrame) -> Result<DataFrame> {
    let nulls: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|column| Series::full_null(column.name().clone(), 1, column.dtype()).into())
        .collect();
    let mut padded = df.clone();
    padded.vstack_mut(&DataFrame::new(nulls)?)?;
    Ok(padded)
}

fn gather(df: &DataFrame, positions: Vec<IdxSize>) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), positions);
    Ok(df.take(&idx)?)
}

/// Join `incoming` onto `existing` on `keys`.
///
/// Existing columns win name collisions. When the incoming source repeats a
/// key, its first row is used. In [`JoinMode::Outer`] the key columns of
/// incoming-only rows are filled from the incoming source; every other
/// existing column is null on those rows.
pub fn merge_source(
    source_name: &str,
    existing: &DataFrame,
    incoming: &DataFrame,
    keys: &JoinKeys,
    mode: JoinMode,
) -> Result<MergeOutcome> {
    let key_columns = keys.columns();
    let existing_names: Vec<String> = existing
        .get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut added_columns = Vec::new();
    let mut dropped_columns = Vec::new();
    for name in incoming.get_column_names_owned() {
        let name = name.to_string();
        if key_columns.contains(&name.as_str()) {
            continue;
        }
        if existing_names.contains(&name) {
            debug!(source = source_name, column = %name, "existing column kept, incoming dropped");
            dropped_columns.push(name);
        } else {
            added_columns.push(name);
        }
    }

    let incoming_keys = row_keys(incoming, &key_columns)?;
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(incoming_keys.len());
    let mut duplicates = 0usize;
    for (row, key) in incoming_keys.iter().enumerate() {
        if let Some(key) = key {
            if index.contains_key(key.as_str()) {
                duplicates += 1;
            } else {
                index.insert(key.as_str(), row);
            }
        }
    }
    if duplicates > 0 {
        warn!(
            source = source_name,
            keys = %keys,
            duplicates,
            "incoming source repeats join keys; first row per key is used"
        );
    }

    let existing_null = existing.height() as IdxSize;
    let incoming_null = incoming.height() as IdxSize;
    let mut left_positions: Vec<IdxSize> = Vec::with_capacity(existing.height());
    let mut right_positions: Vec<IdxSize> = Vec::with_capacity(existing.height());
    let mut origins = Vec::with_capacity(existing.height());
    let mut used = vec![false; incoming.height()];

    for (row, key) in row_keys(existing, &key_columns)?.iter().enumerate() {
        left_positions.push(row as IdxSize);
        match key.as_deref().and_then(|key| index.get(key)) {
            Some(&matched) => {
                used[matched] = true;
                right_positions.push(matched as IdxSize);
                origins.push(RowOrigin::Matched);
            }
            None => {
                right_positions.push(incoming_null);
                origins.push(RowOrigin::ExistingOnly);
            }
        }
    }

    if mode == JoinMode::Outer {
        let mut unmatched: Vec<usize> = index
            .values()
            .copied()
            .filter(|row| !used[*row])
            .collect();
        unmatched.sort_unstable();
        for row in unmatched {
            left_positions.push(existing_null);
            right_positions.push(row as IdxSize);
            origins.push(RowOrigin::IncomingOnly);
        }
    }

    let mut table = gather(&with_null_row(existing)?, left_positions)?;
    let right_columns: Vec<&str> = key_columns
        .iter()
        .copied()
        .chain(added_columns.iter().map(String::as_str))
        .collect();
    let right = gather(&with_null_row(&incoming.select(right_columns)?)?, right_positions)?;

    if mode == JoinMode::Outer {
        for key in &key_columns {
            let left = table.column(key)?.as_materialized_series().clone();
            let fallback = right
                .column(key)?
                .as_materialized_series()
                .cast(left.dtype())?;
            let coalesced = left.zip_with(&left.is_not_null(), &fallback)?;
            table.with_column(coalesced)?;
        }
    }
    for name in &added_columns {
        table.with_column(right.column(name)?.clone())?;
    }

    let outcome = MergeOutcome {
        table,
        origins,
        added_columns,
        dropped_columns,
    };
    info!(
        source = source_name,
        keys = %keys,
        mode = ?mode,
        matched = outcome.count(RowOrigin::Matched),
        existing_only = outcome.count(RowOrigin::ExistingOnly),
        incoming_only = outcome.count(RowOrigin::IncomingOnly),
        added_columns = outcome.added_columns.len(),
        "merged source"
    );
    Ok(outcome)
}
