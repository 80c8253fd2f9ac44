//! Join key resolution.

use std::fmt;

use polars::prelude::DataFrame;

use geoframe_common::column_text;
use geoframe_model::columns::{DATE, ENTITY_KEY_PRIORITY, REGION_NAME};
use geoframe_model::{PipelineError, Result};

/// Columns two tables are joined on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinKeys {
    /// Most specific entity identifier shared by both sides.
    pub entity: Option<String>,
    /// Join on `region_name` as well.
    pub region: bool,
    /// Join on `date` as well.
    pub date: bool,
}

impl JoinKeys {
    /// Key column names: entity, region, date.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(3);
        if let Some(entity) = &self.entity {
            columns.push(entity.as_str());
        }
        if self.region {
            columns.push(REGION_NAME);
        }
        if self.date {
            columns.push(DATE);
        }
        columns
    }
}

impl fmt::Display for JoinKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.columns().join(", "))
    }
}

fn has(columns: &[String], name: &str) -> bool {
    columns.iter().any(|column| column == name)
}

/// Identity columns of the geo source. It may have no entity key at all.
pub fn resolve_geo_keys(columns: &[String]) -> JoinKeys {
    JoinKeys {
        entity: ENTITY_KEY_PRIORITY
            .iter()
            .find(|key| has(columns, key))
            .map(|key| (*key).to_string()),
        region: has(columns, REGION_NAME),
        date: has(columns, DATE),
    }
}

/// Keys for joining a feature source onto the accumulated table.
///
/// The entity key is the highest-priority identifier present on both sides;
/// `region_name` and `date` are added when both sides carry them.
///
/// # Errors
///
/// [`PipelineError::KeyResolution`] when no entity identifier is shared.
pub fn resolve_join_keys(
    source_name: &str,
    existing: &[String],
    incoming: &[String],
) -> Result<JoinKeys> {
    let shared = |name: &str| has(existing, name) && has(incoming, name);
    let entity = ENTITY_KEY_PRIORITY
        .iter()
        .find(|key| shared(key))
        .map(|key| (*key).to_string())
        .ok_or_else(|| PipelineError::KeyResolution {
            source_name: source_name.to_string(),
            message: format!(
                "none of {} is present in both the source and the table",
                ENTITY_KEY_PRIORITY.join(", ")
            ),
        })?;
    Ok(JoinKeys {
        entity: Some(entity),
        region: shared(REGION_NAME),
        date: shared(DATE),
    })
}

const KEY_SEPARATOR: char = '\u{1f}';

/// Per-row key tuples rendered as text; `None` when any component is null.
///
/// Values compare by their text form, so a numeric code matches the same
/// code read as text.
pub fn row_keys(df: &DataFrame, columns: &[&str]) -> Result<Vec<Option<String>>> {
    let mut keys: Vec<Option<String>> = vec![Some(String::new()); df.height()];
    for (position, column) in columns.iter().enumerate() {
        let values = column_text(df, column)?;
        for (key, value) in keys.iter_mut().zip(values) {
            *key = match (key.take(), value) {
                (Some(mut acc), Some(value)) => {
                    if position > 0 {
                        acc.push(KEY_SEPARATOR);
                    }
                    acc.push_str(&value);
                    Some(acc)
                }
                _ => None,
            };
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn highest_priority_shared_key_wins() {
        let existing = names(&["date", "country_code", "country_name", "region_name"]);
        let incoming = names(&["country_name", "country_code", "cases"]);
        let keys = resolve_join_keys("cases", &existing, &incoming).unwrap();
        assert_eq!(keys.entity.as_deref(), Some("country_code"));
        assert!(!keys.region);
        assert!(!keys.date);
        assert_eq!(keys.columns(), vec!["country_code"]);
    }

    #[test]
    fn falls_back_to_name_when_codes_differ() {
        let existing = names(&["country_code", "country_name"]);
        let incoming = names(&["country_code3", "country_name", "region_name", "date"]);
        let keys = resolve_join_keys("x", &existing, &incoming).unwrap();
        assert_eq!(keys.entity.as_deref(), Some("country_name"));
        assert!(!keys.region);
    }

    #[test]
    fn region_and_date_join_when_shared() {
        let both = names(&["date", "country_code", "region_name", "value"]);
        let keys = resolve_join_keys("x", &both, &both).unwrap();
        assert_eq!(keys.to_string(), "[country_code, region_name, date]");
    }

    #[test]
    fn no_shared_entity_is_an_error() {
        let existing = names(&["country_code", "date"]);
        let incoming = names(&["date", "value"]);
        let err = resolve_join_keys("weather", &existing, &incoming).unwrap_err();
        assert!(matches!(err, PipelineError::KeyResolution { source_name, .. } if source_name == "weather"));
    }

    #[test]
    fn geo_source_may_lack_an_entity() {
        let keys = resolve_geo_keys(&names(&["date", "region_name"]));
        assert_eq!(keys.entity, None);
        assert!(keys.region);
        assert!(keys.date);
    }
}
