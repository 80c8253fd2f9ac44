//! Single-column geographic identity.

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use geoframe_common::column_text;
use geoframe_model::columns::{GEO_CODE, REGION_NAME};
use geoframe_model::{Field, Result};

use crate::keys::JoinKeys;

/// `entity` for country-level rows, `entity/region` otherwise.
pub fn geo_code(entity: &str, region: Option<&str>) -> String {
    match region {
        Some(region) if !region.is_empty() => format!("{entity}/{region}"),
        _ => entity.to_string(),
    }
}

/// Add a `geo_code` column built from the entity key and region.
///
/// Returns the declared field, or `None` when the table has no entity key or
/// already carries the column.
pub fn add_geo_code(df: &mut DataFrame, keys: &JoinKeys) -> Result<Option<Field>> {
    let Some(entity) = keys.entity.as_deref() else {
        debug!("no entity key, geo_code not derived");
        return Ok(None);
    };
    if df.get_column_index(GEO_CODE).is_some() {
        return Ok(None);
    }
    let entities = column_text(df, entity)?;
    let regions = if keys.region {
        column_text(df, REGION_NAME)?
    } else {
        vec![None; df.height()]
    };
    let codes: Vec<Option<String>> = entities
        .iter()
        .zip(&regions)
        .map(|(entity, region)| {
            entity
                .as_deref()
                .map(|entity| geo_code(entity, region.as_deref()))
        })
        .collect();
    df.with_column(Series::new(GEO_CODE.into(), codes))?;
    Ok(Some(Field::nominal(GEO_CODE)))
}
