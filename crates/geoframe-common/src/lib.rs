//! Shared utilities for geoframe crates.
//!
//! This crate provides Polars DataFrame helpers and calendar date conversions
//! used across the workspace.

pub mod dates;
pub mod polars;

pub use dates::{date_to_days, days_to_date, parse_date};
pub use polars::{
    column_bool, column_days, column_f64, column_i64, column_text, date_series, format_numeric,
    integral_f64, null_count, parse_bool, parse_f64, parse_i64,
};
