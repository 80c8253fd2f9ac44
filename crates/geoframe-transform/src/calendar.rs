//! Calendar components derived from a date.
//!
//! The same components drive temporal expansion (matching partial-time
//! columns against candidate dates) and the derived columns added to the
//! geo table.

use chrono::{Datelike, NaiveDate};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use geoframe_common::{column_days, days_to_date};
use geoframe_model::columns::{
    DATE, DAY_OF_MONTH, DAY_OF_WEEK, DAY_OF_YEAR, MONTH, QUARTER, WEEK, YEAR,
};
use geoframe_model::{Field, Result};

/// One calendar component of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarField {
    Year,
    Quarter,
    Month,
    /// ISO 8601 week number.
    Week,
    /// Monday = 1 through Sunday = 7.
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
}

impl CalendarField {
    pub const ALL: [CalendarField; 7] = [
        Self::Year,
        Self::Quarter,
        Self::Month,
        Self::Week,
        Self::DayOfWeek,
        Self::DayOfMonth,
        Self::DayOfYear,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::Year => YEAR,
            Self::Quarter => QUARTER,
            Self::Month => MONTH,
            Self::Week => WEEK,
            Self::DayOfWeek => DAY_OF_WEEK,
            Self::DayOfMonth => DAY_OF_MONTH,
            Self::DayOfYear => DAY_OF_YEAR,
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }

    /// Component value for `date`.
    pub fn of(self, date: NaiveDate) -> i64 {
        let value = match self {
            Self::Year => return i64::from(date.year()),
            Self::Quarter => date.month0() / 3 + 1,
            Self::Month => date.month(),
            Self::Week => date.iso_week().week(),
            Self::DayOfWeek => date.weekday().number_from_monday(),
            Self::DayOfMonth => date.day(),
            Self::DayOfYear => date.ordinal(),
        };
        i64::from(value)
    }

    /// Inclusive range every value of this component falls in.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Self::Year => (1, 9999),
            Self::Quarter => (1, 4),
            Self::Month => (1, 12),
            Self::Week => (1, 53),
            Self::DayOfWeek => (1, 7),
            Self::DayOfMonth => (1, 31),
            Self::DayOfYear => (1, 366),
        }
    }

    /// Ordinal field declaration with static bounds.
    pub fn field(self) -> Field {
        let (minimum, maximum) = self.bounds();
        Field::ordinal(self.column(), minimum, maximum)
    }
}

/// Declarations for every calendar column.
pub fn calendar_fields() -> Vec<Field> {
    CalendarField::ALL.into_iter().map(CalendarField::field).collect()
}

/// Add calendar columns derived from `date`, skipping any already present.
///
/// Returns the fields that were added.
pub fn add_calendar_columns(df: &mut DataFrame) -> Result<Vec<Field>> {
    let dates: Vec<Option<NaiveDate>> = column_days(df, DATE)?
        .into_iter()
        .map(|days| days.and_then(days_to_date))
        .collect();

    let mut added = Vec::new();
    for field in CalendarField::ALL {
        let name = field.column();
        if df.get_column_index(name).is_some() {
            debug!(column = name, "calendar column already present");
            continue;
        }
        let values: Vec<Option<i64>> = dates.iter().map(|date| date.map(|d| field.of(d))).collect();
        df.with_column(Series::new(name.into(), values))?;
        added.push(field.field());
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_of_mid_march() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
        assert_eq!(CalendarField::Year.of(date), 2020);
        assert_eq!(CalendarField::Quarter.of(date), 1);
        assert_eq!(CalendarField::Month.of(date), 3);
        assert_eq!(CalendarField::Week.of(date), 11);
        assert_eq!(CalendarField::DayOfWeek.of(date), 7);
        assert_eq!(CalendarField::DayOfMonth.of(date), 15);
        assert_eq!(CalendarField::DayOfYear.of(date), 75);
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(CalendarField::Week.of(date), 53);
        assert_eq!(CalendarField::Year.of(date), 2021);
    }

    #[test]
    fn column_names_round_trip() {
        for field in CalendarField::ALL {
            assert_eq!(CalendarField::from_column(field.column()), Some(field));
        }
        assert_eq!(CalendarField::from_column("date"), None);
    }
}
