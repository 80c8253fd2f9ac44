//! Imputation rules: a grouping key set plus a fill strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

/// How a group's non-null values produce a replacement for its null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    Mean,
    Median,
    Min,
    Max,
    /// Last non-null value in date order; leading nulls stay null.
    ///
    /// Follow it with a [`FillStrategy::Zero`] rule to also zero the
    /// leading gaps.
    ForwardFill,
    /// Constant zero (or `false` for boolean columns).
    Zero,
}

impl FillStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::ForwardFill => "forward_fill",
            Self::Zero => "zero",
        }
    }

    /// Whether this strategy can produce values of the given kind.
    pub fn supports(&self, kind: &FieldKind) -> bool {
        match self {
            Self::Mean | Self::Median => kind.is_numeric(),
            Self::Zero => kind.is_numeric() || matches!(kind, FieldKind::Boolean),
            Self::Min | Self::Max | Self::ForwardFill => true,
        }
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of an imputation cascade.
///
/// An empty key set treats the whole table as a single group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    pub strategy: FillStrategy,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl Imputation {
    pub fn new<I, S>(strategy: FillStrategy, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// A rule over the whole table.
    pub fn global(strategy: FillStrategy) -> Self {
        Self {
            strategy,
            keys: Vec::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for Imputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            write!(f, "{} (global)", self.strategy)
        } else {
            write!(f, "{} by [{}]", self.strategy, self.keys.join(", "))
        }
    }
}
