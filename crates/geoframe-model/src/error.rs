//! Error type shared by every pipeline stage.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that abort a pipeline invocation.
///
/// None of these are retried; each names the source or column at fault.
#[derive(Debug, Error)]
pub enum PipelineError {
    // === Loading ===
    /// Source file missing, unreadable, or lacking a declared column.
    #[error("failed to load source '{source_name}' ({path}): {message}")]
    SourceLoad {
        source_name: String,
        path: PathBuf,
        message: String,
    },

    /// No shared entity key between a feature source and the table.
    #[error("no usable entity key for source '{source_name}': {message}")]
    KeyResolution {
        source_name: String,
        message: String,
    },

    /// Explicit date column disagrees with the partial-time columns.
    #[error("ambiguous dates in source '{source_name}': {message}")]
    ExpansionAmbiguity {
        source_name: String,
        message: String,
    },

    // === Imputation ===
    /// A rule that cannot run against this column.
    #[error("cannot impute '{column}': {message}")]
    Imputation { column: String, message: String },

    /// Nulls left after every declared rule ran.
    #[error("'{column}' still has {remaining} null value(s) after all imputation rules")]
    ImputationExhaustion { column: String, remaining: usize },

    // === Validation ===
    #[error("'{column}' failed validation: {message}")]
    Validation { column: String, message: String },

    #[error("cannot coerce '{column}' to {target}: {message}")]
    TypeCoercion {
        column: String,
        target: String,
        message: String,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub fn source_load(
        source_name: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::SourceLoad {
            source_name: source_name.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn coercion(
        column: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            column: column.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn imputation(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Imputation {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Column this error is about, when there is one.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Imputation { column, .. }
            | Self::ImputationExhaustion { column, .. }
            | Self::Validation { column, .. }
            | Self::TypeCoercion { column, .. } => Some(column),
            Self::SourceLoad { .. }
            | Self::KeyResolution { .. }
            | Self::ExpansionAmbiguity { .. }
            | Self::Polars(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
