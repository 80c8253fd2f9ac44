use chrono::{Datelike, NaiveDate};
use polars::prelude::{DataFrame, NamedFrom, Series};
use proptest::prelude::*;

use geoframe_common::{column_i64, date_series, date_to_days};
use geoframe_model::FieldKind;
use geoframe_transform::{CalendarField, add_calendar_columns, calendar_fields};

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=366).prop_filter_map("valid ordinal day", |(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal)
    })
}

proptest! {
    #[test]
    fn prop_components_within_bounds(date in any_date()) {
        for field in CalendarField::ALL {
            let (min, max) = field.bounds();
            let value = field.of(date);
            prop_assert!(value >= min && value <= max, "{:?} = {} for {}", field, value, date);
        }
    }

    #[test]
    fn prop_quarter_follows_month(date in any_date()) {
        let month = CalendarField::Month.of(date);
        let quarter = CalendarField::Quarter.of(date);
        prop_assert_eq!(quarter, (month - 1) / 3 + 1);
    }

    #[test]
    fn prop_day_of_week_matches_chrono(date in any_date()) {
        let expected = i64::from(date.weekday().num_days_from_monday()) + 1;
        prop_assert_eq!(CalendarField::DayOfWeek.of(date), expected);
    }
}

#[test]
fn calendar_fields_are_bounded_ordinals() {
    let fields = calendar_fields();
    assert_eq!(fields.len(), 7);
    for field in fields {
        assert!(matches!(field.kind, FieldKind::Ordinal { .. }));
        let (min, max) = field.kind.bounds();
        assert!(min.and_then(|bound| bound.static_value()).is_some());
        assert!(max.and_then(|bound| bound.static_value()).is_some());
    }
}

#[test]
fn adds_columns_for_each_date() {
    let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
    let mut df = DataFrame::new(vec![
        date_series("date", vec![Some(date_to_days(date)), None])
            .unwrap()
            .into(),
        Series::new("country_code".into(), vec!["DE", "DE"]).into(),
    ])
    .unwrap();

    let added = add_calendar_columns(&mut df).unwrap();
    assert_eq!(added.len(), 7);
    assert_eq!(column_i64(&df, "year").unwrap(), vec![Some(2020), None]);
    assert_eq!(column_i64(&df, "quarter").unwrap()[0], Some(1));
    assert_eq!(column_i64(&df, "month").unwrap()[0], Some(3));
    assert_eq!(column_i64(&df, "day_of_month").unwrap()[0], Some(15));
    assert_eq!(column_i64(&df, "day_of_week").unwrap()[0], Some(7));
    assert_eq!(column_i64(&df, "day_of_year").unwrap()[0], Some(75));
}

#[test]
fn existing_calendar_column_is_kept() {
    let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
    let mut df = DataFrame::new(vec![
        date_series("date", vec![Some(date_to_days(date))])
            .unwrap()
            .into(),
        Series::new("year".into(), vec![1999i64]).into(),
    ])
    .unwrap();

    let added = add_calendar_columns(&mut df).unwrap();
    assert_eq!(added.len(), 6);
    assert_eq!(column_i64(&df, "year").unwrap(), vec![Some(1999)]);
}
