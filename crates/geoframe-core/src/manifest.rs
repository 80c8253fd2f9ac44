//! TOML pipeline manifests.
//!
//! A manifest names the date range, the geo source, the feature sources in
//! merge order and the load options:
//!
//! ```toml
//! [range]
//! start = "2020-03-01"
//! end = "2020-03-31"
//!
//! [geo]
//! name = "countries"
//! location = "countries.csv"
//!
//! [[geo.fields]]
//! name = "country_code"
//! type = "nominal"
//!
//! [[sources]]
//! name = "weather"
//! location = "weather.csv"
//!
//! [[sources.fields]]
//! name = "temperature"
//! type = "numeric"
//! minimum = -90.0
//! maximum = 60.0
//! imputations = [{ strategy = "mean", keys = ["country_code"] }]
//!
//! [options]
//! join = "left"
//! ```
//!
//! Relative locations resolve against the manifest's directory.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

use geoframe_model::{DateRange, PipelineError, Result, Schema, SourceDescriptor};

use crate::options::LoadOptions;
use crate::pipeline;

/// Everything one [`pipeline::load`] call needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineManifest {
    pub range: DateRange,
    pub geo: SourceDescriptor,
    #[serde(default)]
    pub sources: Vec<SourceDescriptor>,
    #[serde(default)]
    pub options: LoadOptions,
}

impl PipelineManifest {
    /// Parse a manifest from TOML text. Locations are left as written.
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Self> {
        let manifest: Self = toml::from_str(contents).map_err(|e| {
            PipelineError::source_load("manifest", origin, format!("invalid manifest: {e}"))
        })?;
        manifest.check(origin)?;
        Ok(manifest)
    }

    /// Source names must be unique and every source must declare columns.
    fn check(&self, origin: &Path) -> Result<()> {
        let mut names = BTreeSet::new();
        for source in std::iter::once(&self.geo).chain(&self.sources) {
            if !names.insert(source.name.as_str()) {
                return Err(PipelineError::source_load(
                    "manifest",
                    origin,
                    format!("duplicate source name '{}'", source.name),
                ));
            }
            if source.fields.is_empty() {
                return Err(PipelineError::source_load(
                    &source.name,
                    &source.location,
                    "source declares no fields",
                ));
            }
        }
        Ok(())
    }

    fn resolve_locations(&mut self, base: &Path) {
        self.geo.resolve_location(base);
        for source in &mut self.sources {
            source.resolve_location(base);
        }
    }

    /// Run the pipeline this manifest describes.
    pub fn run(&self) -> Result<(DataFrame, Schema)> {
        pipeline::load(&self.range, &self.geo, &self.sources, &self.options)
    }
}

/// Read `path` and resolve relative source locations against its directory.
///
/// # Errors
///
/// [`PipelineError::SourceLoad`] when the file is unreadable, is not a valid
/// manifest, repeats a source name or has a source without fields.
pub fn load_manifest(path: &Path) -> Result<PipelineManifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::source_load("manifest", path, format!("cannot read manifest: {e}"))
    })?;
    let mut manifest = PipelineManifest::from_toml(&contents, path)?;
    if let Some(base) = path.parent() {
        manifest.resolve_locations(base);
    }
    info!(
        path = %path.display(),
        sources = manifest.sources.len(),
        "manifest loaded"
    );
    Ok(manifest)
}
