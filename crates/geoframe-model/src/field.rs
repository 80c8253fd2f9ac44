//! Column declarations.
//!
//! A [`Field`] names a column, fixes its semantic kind and carries the
//! imputation cascade that fills its gaps. The kind is a closed set; the
//! loader, imputer and validator all dispatch on it with `match`.

use std::fmt;

use polars::prelude::DataType;
use serde::{Deserialize, Serialize};

use crate::imputation::Imputation;

/// Lower or upper limit for an ordinal or numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// Constant limit, checked during validation.
    Static(f64),
    /// Limit taken from another column of the same row.
    ///
    /// Row-computed limits are exempt from static range validation.
    Column { column: String },
}

impl Bound {
    /// The constant limit, if this bound is static.
    pub fn static_value(&self) -> Option<f64> {
        match self {
            Self::Static(value) => Some(*value),
            Self::Column { .. } => None,
        }
    }

    pub fn per_row(column: impl Into<String>) -> Self {
        Self::Column {
            column: column.into(),
        }
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Static(value)
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Self::Static(value as f64)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Self::Static(f64::from(value))
    }
}

/// Semantic column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    /// Integer-valued, optionally bounded.
    Ordinal {
        #[serde(default)]
        minimum: Option<Bound>,
        #[serde(default)]
        maximum: Option<Bound>,
    },
    /// Float-valued, optionally bounded.
    Numeric {
        #[serde(default)]
        minimum: Option<Bound>,
        #[serde(default)]
        maximum: Option<Bound>,
    },
    /// Free text / categorical.
    Nominal,
    Boolean,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Ordinal { .. } => "ordinal",
            Self::Numeric { .. } => "numeric",
            Self::Nominal => "nominal",
            Self::Boolean => "boolean",
        }
    }

    /// Ordinal and numeric columns take part in range checks and averaging.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Ordinal { .. } | Self::Numeric { .. })
    }

    /// `(minimum, maximum)` for bounded kinds.
    pub fn bounds(&self) -> (Option<&Bound>, Option<&Bound>) {
        match self {
            Self::Ordinal { minimum, maximum } | Self::Numeric { minimum, maximum } => {
                (minimum.as_ref(), maximum.as_ref())
            }
            Self::Date | Self::Nominal | Self::Boolean => (None, None),
        }
    }

    /// Polars dtype a column of this kind has once validated.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Date => DataType::Date,
            Self::Ordinal { .. } => DataType::Int64,
            Self::Numeric { .. } => DataType::Float64,
            Self::Nominal => DataType::String,
            Self::Boolean => DataType::Boolean,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Fallback rules, tried in order while nulls remain.
    #[serde(default)]
    pub imputations: Vec<Imputation>,
    /// Emit a `<name>_missing` boolean column recording raw nullness.
    #[serde(default)]
    pub mark_missing: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            imputations: Vec::new(),
            mark_missing: false,
        }
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn nominal(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Nominal)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn ordinal(
        name: impl Into<String>,
        minimum: impl Into<Bound>,
        maximum: impl Into<Bound>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Ordinal {
                minimum: Some(minimum.into()),
                maximum: Some(maximum.into()),
            },
        )
    }

    pub fn numeric(
        name: impl Into<String>,
        minimum: impl Into<Bound>,
        maximum: impl Into<Bound>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Numeric {
                minimum: Some(minimum.into()),
                maximum: Some(maximum.into()),
            },
        )
    }

    /// Numeric column without limits.
    pub fn unbounded_numeric(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Numeric {
                minimum: None,
                maximum: None,
            },
        )
    }

    #[must_use]
    pub fn with_imputation(mut self, imputation: Imputation) -> Self {
        self.imputations.push(imputation);
        self
    }

    #[must_use]
    pub fn with_imputations(mut self, imputations: impl IntoIterator<Item = Imputation>) -> Self {
        self.imputations.extend(imputations);
        self
    }

    #[must_use]
    pub fn marking_missing(mut self) -> Self {
        self.mark_missing = true;
        self
    }

    pub fn has_imputations(&self) -> bool {
        !self.imputations.is_empty()
    }
}
