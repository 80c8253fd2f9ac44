//! Load configuration.

use serde::{Deserialize, Serialize};

use geoframe_transform::JoinMode;

/// How feature sources are joined onto the geo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// `outer` widens the imputation context with rows only a feature source
    /// has; those rows are dropped again once the source is imputed.
    pub join: JoinMode,
    /// Drop rows whose geo identity the geo source does not know.
    pub purge_unmatched: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            join: JoinMode::Outer,
            purge_unmatched: true,
        }
    }
}

impl LoadOptions {
    /// Only ever extend existing rows.
    pub fn left() -> Self {
        Self {
            join: JoinMode::Left,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_join(mut self, join: JoinMode) -> Self {
        self.join = join;
        self
    }

    #[must_use]
    pub fn with_purge_unmatched(mut self, purge: bool) -> Self {
        self.purge_unmatched = purge;
        self
    }
}
