//! Table transformations for geoframe.
//!
//! Each module is one stage of assembling the daily table:
//! [`expand`] turns partial-time rows into daily rows, [`calendar`] derives
//! date components, [`keys`] picks join columns, [`merge`] joins a source onto
//! the accumulated table and [`impute`] fills the gaps that remain.

pub mod calendar;
pub mod expand;
pub mod geo;
pub mod impute;
pub mod keys;
pub mod merge;

pub use calendar::{CalendarField, add_calendar_columns, calendar_fields};
pub use expand::{DatePredicate, expand_source, partial_time_columns};
pub use geo::{add_geo_code, geo_code};
pub use impute::{GroupIndex, date_order, ensure_imputed, impute_fields, mark_missing};
pub use keys::{JoinKeys, resolve_geo_keys, resolve_join_keys, row_keys};
pub use merge::{JoinMode, MergeOutcome, RowOrigin, merge_source};
