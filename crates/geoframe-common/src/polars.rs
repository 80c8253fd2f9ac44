//! Polars value and column helpers.
//!
//! This module provides typed extraction of whole columns, numeric formatting
//! for messages, and string parsing used when sources are read.

use polars::prelude::*;

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use geoframe_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Some(v as i64)` when `v` has no fractional part and fits.
pub fn integral_f64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses a string as `i64`, accepting integral decimals such as `3.0`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_f64))
}

/// Parses common boolean spellings, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn series<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a Series> {
    Ok(df.column(name)?.as_materialized_series())
}

/// All values of a column as `f64`; non-numeric values become `None`.
pub fn column_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series(df, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// All values of a column as `i64`; fractional values are truncated by the cast.
pub fn column_i64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let cast = series(df, name)?.cast(&DataType::Int64)?;
    Ok(cast.i64()?.into_iter().collect())
}

/// All values of a column as text; dates render as `YYYY-MM-DD`.
pub fn column_text(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let cast = series(df, name)?.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// All values of a boolean (or 0/1 numeric) column.
pub fn column_bool(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<bool>>> {
    let cast = series(df, name)?.cast(&DataType::Boolean)?;
    Ok(cast.bool()?.into_iter().collect())
}

/// All values of a date column as days since the Unix epoch.
pub fn column_days(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let cast = series(df, name)?.cast(&DataType::Int32)?;
    Ok(cast.i32()?.into_iter().collect())
}

/// Number of nulls in a column.
pub fn null_count(df: &DataFrame, name: &str) -> PolarsResult<usize> {
    Ok(df.column(name)?.null_count())
}

/// Builds a `Date` series from epoch-day values.
pub fn date_series(name: &str, days: Vec<Option<i32>>) -> PolarsResult<Series> {
    Series::new(name.into(), days).cast(&DataType::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(-0.25), "-0.25");
    }

    #[test]
    fn test_parse_i64_accepts_integral_decimal() {
        assert_eq!(parse_i64("3.0"), Some(3));
        assert_eq!(parse_i64(" 42 "), Some(42));
        assert_eq!(parse_i64("2.5"), None);
        assert_eq!(parse_i64(""), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("n"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_column_extraction() {
        let df = DataFrame::new(vec![
            Series::new("x".into(), vec![Some(1i64), None, Some(3)]).into(),
            Series::new("s".into(), vec![Some("a"), None, Some("c")]).into(),
        ])
        .unwrap();
        assert_eq!(
            column_f64(&df, "x").unwrap(),
            vec![Some(1.0), None, Some(3.0)]
        );
        assert_eq!(
            column_text(&df, "s").unwrap(),
            vec![Some("a".to_string()), None, Some("c".to_string())]
        );
        assert_eq!(null_count(&df, "x").unwrap(), 1);
        assert!(column_f64(&df, "missing").is_err());
    }

    #[test]
    fn test_date_series_round_trip() {
        let series = date_series("date", vec![Some(0), None, Some(18_336)]).unwrap();
        assert_eq!(series.dtype(), &DataType::Date);
        let df = DataFrame::new(vec![series.into()]).unwrap();
        assert_eq!(
            column_days(&df, "date").unwrap(),
            vec![Some(0), None, Some(18_336)]
        );
    }
}
