//! Error types for ember-core

use crate::Position;
use thiserror::Error;

/// Core error type
///
/// Device operations never fail; these errors only come from grid placement
/// and from decoding saved grids.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Position already occupied: {0}")]
    PositionOccupied(Position),

    #[error("No block at {0}")]
    NoBlockAt(Position),

    #[error("Wrong block kind at {pos}: expected {expected}, got {got}")]
    WrongBlockKind {
        pos: Position,
        expected: &'static str,
        got: &'static str,
    },

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON encode error: {0}")]
    RonEncode(#[from] ron::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
