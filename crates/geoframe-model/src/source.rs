//! Source descriptors: where a dataset lives and which columns it contributes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// One ingestible dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Short label used in logs and errors.
    pub name: String,
    pub location: PathBuf,
    /// Columns to read, in declaration order.
    pub fields: Vec<Field>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Resolve a relative location against `base`.
    pub fn resolve_location(&mut self, base: &Path) {
        if self.location.is_relative() {
            self.location = base.join(&self.location);
        }
    }
}
