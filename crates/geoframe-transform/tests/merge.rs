use polars::prelude::{DataFrame, NamedFrom, Series};

use geoframe_common::{column_f64, column_text};
use geoframe_transform::{JoinKeys, JoinMode, RowOrigin, merge_source};

fn country_keys() -> JoinKeys {
    JoinKeys {
        entity: Some("country_code".to_string()),
        region: false,
        date: false,
    }
}

fn table() -> DataFrame {
    DataFrame::new(vec![
        Series::new("country_code".into(), vec![Some("DE"), Some("FR"), None]).into(),
        Series::new("population".into(), vec![83.0f64, 67.0, 1.0]).into(),
    ])
    .unwrap()
}

#[test]
fn left_join_keeps_row_count_with_duplicate_keys() {
    let incoming = DataFrame::new(vec![
        Series::new("country_code".into(), vec!["DE", "DE", "IT"]).into(),
        Series::new("cases".into(), vec![1.0f64, 2.0, 3.0]).into(),
    ])
    .unwrap();

    let outcome = merge_source("cases", &table(), &incoming, &country_keys(), JoinMode::Left).unwrap();
    assert_eq!(outcome.table.height(), 3);
    assert_eq!(
        column_f64(&outcome.table, "cases").unwrap(),
        vec![Some(1.0), None, None]
    );
    assert_eq!(
        outcome.origins,
        vec![
            RowOrigin::Matched,
            RowOrigin::ExistingOnly,
            RowOrigin::ExistingOnly
        ]
    );
    assert_eq!(outcome.added_columns, vec!["cases".to_string()]);
}

#[test]
fn outer_join_admits_and_coalesces_new_keys() {
    let incoming = DataFrame::new(vec![
        Series::new("country_code".into(), vec!["IT", "FR"]).into(),
        Series::new("cases".into(), vec![3.0f64, 4.0]).into(),
    ])
    .unwrap();

    let outcome =
        merge_source("cases", &table(), &incoming, &country_keys(), JoinMode::Outer).unwrap();
    assert_eq!(outcome.table.height(), 4);
    assert_eq!(outcome.count(RowOrigin::IncomingOnly), 1);
    assert_eq!(
        column_text(&outcome.table, "country_code").unwrap(),
        vec![
            Some("DE".to_string()),
            Some("FR".to_string()),
            None,
            Some("IT".to_string())
        ]
    );
    assert_eq!(
        column_f64(&outcome.table, "population").unwrap()[3],
        None
    );
    assert_eq!(
        column_f64(&outcome.table, "cases").unwrap(),
        vec![None, Some(4.0), None, Some(3.0)]
    );
}

#[test]
fn existing_column_wins_collision() {
    let incoming = DataFrame::new(vec![
        Series::new("country_code".into(), vec!["DE", "FR"]).into(),
        Series::new("population".into(), vec![1.0f64, 2.0]).into(),
    ])
    .unwrap();

    let outcome = merge_source("pop", &table(), &incoming, &country_keys(), JoinMode::Left).unwrap();
    assert_eq!(outcome.dropped_columns, vec!["population".to_string()]);
    assert!(outcome.added_columns.is_empty());
    assert_eq!(
        column_f64(&outcome.table, "population").unwrap(),
        vec![Some(83.0), Some(67.0), Some(1.0)]
    );
}

#[test]
fn numeric_code_matches_text_code() {
    let existing = DataFrame::new(vec![
        Series::new("country_code_numeric".into(), vec!["276", "250"]).into(),
    ])
    .unwrap();
    let incoming = DataFrame::new(vec![
        Series::new("country_code_numeric".into(), vec![250i64]).into(),
        Series::new("gdp".into(), vec![2.7f64]).into(),
    ])
    .unwrap();
    let keys = JoinKeys {
        entity: Some("country_code_numeric".to_string()),
        ..JoinKeys::default()
    };

    let outcome = merge_source("gdp", &existing, &incoming, &keys, JoinMode::Left).unwrap();
    assert_eq!(
        column_f64(&outcome.table, "gdp").unwrap(),
        vec![None, Some(2.7)]
    );
}
