//! Kernel-wide base error type.
//!
//! Sub-crates define their own error enums (`SpatialError`, `BehaviorError`,
//! …) and wrap `CoreError` where they need to.  Prefer whichever keeps error
//! sites clean.

use thiserror::Error;

/// The base error type for `ms-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `ms-core`.
pub type CoreResult<T> = Result<T, CoreError>;
