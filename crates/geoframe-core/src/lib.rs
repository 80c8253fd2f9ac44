//! Pipeline orchestration for geoframe.
//!
//! [`load`] reads the geo source and every feature source, expands them to
//! daily rows, merges, imputes and validates, returning one table plus its
//! [`Schema`](geoframe_model::Schema). [`load_manifest`] reads the same inputs
//! from a TOML file.

pub mod logging;
pub mod manifest;
pub mod options;
pub mod pipeline;

pub use manifest::{PipelineManifest, load_manifest};
pub use options::LoadOptions;
pub use pipeline::{impute, load};
