//! Error types for map loading and placement.

use thiserror::Error;

use crate::math::TilePos;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Top-level error type for map loading and population.
///
/// Placement that simply fails to find a spot is not an error; those paths
/// return `bool` or a placed count instead.
#[derive(Debug, Error)]
pub enum MapError {
    /// Mission or config data failed to parse.
    #[error("Failed to parse {what}: {message}")]
    ParseError {
        /// What was being parsed.
        what: &'static str,
        /// Error message.
        message: String,
    },

    /// A grid was requested with a zero or negative dimension.
    #[error("Invalid map size {width}x{height}")]
    InvalidSize {
        /// Requested width in tiles.
        width: i32,
        /// Requested height in tiles.
        height: i32,
    },

    /// Access layer snapshot could not be encoded or decoded.
    #[error("Access layer snapshot error: {0}")]
    SnapshotError(String),

    /// A key could not be placed before the safety valve tripped.
    #[error("No room tile for key {key_index} (access {access:#06x}) after {attempts} attempts")]
    KeyPlacementExhausted {
        /// Index of the key being placed.
        key_index: usize,
        /// Raw access bits the room tile had to match.
        access: u16,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Expanding ring search covered the whole grid without a match.
    #[error("No matching tile found around {start:?}")]
    SearchExhausted {
        /// Where the search started.
        start: TilePos,
    },

    /// A map style generator failed to populate the grid.
    #[error("Map generator failed: {0}")]
    GeneratorFailed(String),
}
