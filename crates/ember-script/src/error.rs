//! Error types for ember-script

use ember_core::Position;
use thiserror::Error;

/// Layout loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Duplicate block position: {0}")]
    DuplicatePosition(Position),

    #[error("Duplicate layout: {0}")]
    DuplicateLayout(String),

    #[error(transparent)]
    Core(#[from] ember_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
