use polars::prelude::{DataFrame, DataType, NamedFrom, Series};

use geoframe_model::{Bound, Field, PipelineError, Schema};
use geoframe_validate::{coerce_table, validate_and_coerce, validate_table};

fn schema() -> Schema {
    [
        Field::nominal("country_code"),
        Field::ordinal("level", 0, 3),
        Field::numeric("cases", 0.0, 100.0),
        Field::numeric("deaths", 0.0, Bound::per_row("cases")),
    ]
    .into_iter()
    .collect()
}

fn table(level: Vec<Option<f64>>, cases: Vec<Option<f64>>) -> DataFrame {
    let rows = level.len();
    DataFrame::new(vec![
        Series::new("level".into(), level).into(),
        Series::new("country_code".into(), vec!["DE"; rows]).into(),
        Series::new("deaths".into(), vec![500.0f64; rows]).into(),
        Series::new("cases".into(), cases).into(),
    ])
    .unwrap()
}

#[test]
fn valid_table_is_coerced_and_sorted() {
    let df = table(vec![Some(1.0), Some(3.0)], vec![Some(5.0), Some(100.0)]);

    let out = validate_and_coerce(df, &schema()).unwrap();
    let names: Vec<String> = out
        .get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["cases", "country_code", "deaths", "level"]);
    assert_eq!(out.column("level").unwrap().dtype(), &DataType::Int64);
    assert_eq!(out.column("cases").unwrap().dtype(), &DataType::Float64);
}

#[test]
fn nulls_fail_validation() {
    let df = table(vec![Some(1.0), None], vec![Some(5.0), Some(6.0)]);

    let err = validate_table(&df, &schema()).unwrap_err();
    match err {
        PipelineError::Validation { column, message } => {
            assert_eq!(column, "level");
            assert!(message.contains("null values present"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn static_maximum_is_enforced() {
    let df = table(vec![Some(1.0), Some(2.0)], vec![Some(5.0), Some(101.0)]);

    let err = validate_table(&df, &schema()).unwrap_err();
    match err {
        PipelineError::Validation { column, message } => {
            assert_eq!(column, "cases");
            assert!(message.contains("out of bounds"));
            assert!(message.contains("maximum 101"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn static_minimum_is_enforced() {
    let df = table(vec![Some(-1.0), Some(2.0)], vec![Some(5.0), Some(6.0)]);

    let err = validate_table(&df, &schema()).unwrap_err();
    assert_eq!(err.column(), Some("level"));
    assert!(err.to_string().contains("minimum -1"));
}

#[test]
fn row_bound_is_exempt() {
    // deaths = 500 exceeds the per-row bound, which is not checked statically.
    let df = table(vec![Some(1.0)], vec![Some(5.0)]);
    validate_table(&df, &schema()).unwrap();
}

#[test]
fn fractional_ordinal_fails_coercion() {
    let df = table(vec![Some(1.5)], vec![Some(5.0)]);

    let err = coerce_table(df, &schema()).unwrap_err();
    assert!(matches!(err, PipelineError::TypeCoercion { .. }));
    assert_eq!(err.column(), Some("level"));
}

#[test]
fn missing_column_fails_validation() {
    let df = DataFrame::new(vec![Series::new("country_code".into(), vec!["DE"]).into()]).unwrap();

    let err = validate_table(&df, &schema()).unwrap_err();
    assert_eq!(err.column(), Some("level"));
}

#[test]
fn nan_fails_validation_even_within_bounds() {
    let df = table(vec![Some(1.0), Some(2.0)], vec![Some(f64::NAN), Some(6.0)]);

    let err = validate_table(&df, &schema()).unwrap_err();
    match err {
        PipelineError::Validation { column, message } => {
            assert_eq!(column, "cases");
            assert!(message.contains("non-finite values present (1 row(s))"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
