//! Spatial-subsystem error type.

use thiserror::Error;

use ms_core::CellId;

use crate::CellIndex;

/// Errors produced by `ms-spatial`.
///
/// All of these are construction-time or structural-update failures; the
/// per-step hot path (rule reads and writes on existing cells) never fails.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cell {0} not found in space")]
    CellNotFound(CellId),

    #[error("no cell at index {0}")]
    IndexNotFound(CellIndex),

    #[error("cell {cell} has no neighborhood named {name:?}")]
    NeighborhoodNotFound { cell: CellId, name: String },

    #[error("invalid grid dimensions {x_dim}x{y_dim}")]
    InvalidGrid { x_dim: u32, y_dim: u32 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
