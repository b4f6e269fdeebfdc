//! Tool errors.

use std::path::PathBuf;

use mapgen_core::error::MapError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors from reading inputs or loading a map.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A layout contained an unknown character.
    #[error("Unknown layout character {ch:?} at line {line}, column {column}")]
    Layout {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// The offending character.
        ch: char,
    },

    /// The layout has no rows.
    #[error("Layout is empty")]
    EmptyLayout,

    /// Map loading failed.
    #[error(transparent)]
    Map(#[from] MapError),

    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
