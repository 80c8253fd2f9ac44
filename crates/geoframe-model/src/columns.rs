//! Well-known column names shared by every source.
//!
//! Sources are joined on these names, so a CSV that wants to take part in
//! key resolution or temporal expansion must use them verbatim.

/// Canonical date column, one row per calendar day after expansion.
pub const DATE: &str = "date";

pub const YEAR: &str = "year";
pub const QUARTER: &str = "quarter";
pub const MONTH: &str = "month";
/// ISO 8601 week number.
pub const WEEK: &str = "week";
/// Day of week with Monday = 1.
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const DAY_OF_MONTH: &str = "day_of_month";
pub const DAY_OF_YEAR: &str = "day_of_year";

/// Two-letter country code.
pub const COUNTRY_CODE: &str = "country_code";
/// Three-letter country code.
pub const COUNTRY_CODE3: &str = "country_code3";
pub const COUNTRY_CODE_NUMERIC: &str = "country_code_numeric";
pub const COUNTRY_NAME: &str = "country_name";
pub const REGION_NAME: &str = "region_name";

/// `<entity>` or `<entity>/<region>`, derived from the geo source.
pub const GEO_CODE: &str = "geo_code";

/// Suffix appended to a field name for its missing-indicator column.
pub const MISSING_INDICATOR_SUFFIX: &str = "_missing";

/// Entity key candidates, most specific identifier first.
pub const ENTITY_KEY_PRIORITY: [&str; 4] = [
    COUNTRY_CODE,
    COUNTRY_CODE3,
    COUNTRY_CODE_NUMERIC,
    COUNTRY_NAME,
];

/// Partial-time columns understood by the temporal expander.
pub const PARTIAL_TIME_COLUMNS: [&str; 7] = [
    YEAR,
    QUARTER,
    MONTH,
    WEEK,
    DAY_OF_WEEK,
    DAY_OF_MONTH,
    DAY_OF_YEAR,
];

/// Name of the missing-indicator column for `field`.
pub fn missing_indicator_name(field: &str) -> String {
    format!("{field}{MISSING_INDICATOR_SUFFIX}")
}
