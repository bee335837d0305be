//! Error types for the census data model.

use thiserror::Error;

use crate::level::Level;

/// Errors raised when model values are constructed from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Level name not one of `state`, `county`, `zcta5`.
    #[error("unknown geographic level '{0}'")]
    UnknownLevel(String),

    /// Filter dimension key not recognised.
    #[error("unknown filter dimension '{0}'")]
    UnknownDimension(String),

    /// Navigation transition not allowed from the current level.
    #[error("cannot {action} while at {level} level")]
    InvalidTransition { action: &'static str, level: Level },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
