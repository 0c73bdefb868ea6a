//! `ms-spatial`: the spatial model: cells, cellular spaces, regions, and
//! weighted neighborhoods.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`index`]        | `CellIndex`: integer `(x, y)` position                   |
//! | [`state`]        | `Value`, `CellState`, `SyncScope`                         |
//! | [`region`]       | `Region`: ordered multimap `CellIndex → CellId`          |
//! | [`neighborhood`] | `Neighborhood`, `Neighbor`: weighted directed graph      |
//! | [`cell`]         | `Cell`: per-agent modes, neighborhoods, past snapshot    |
//! | [`space`]        | `CellularSpace` (cell arena + R-tree), `StructuralChange` |
//! | [`error`]        | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Ownership
//!
//! A `CellularSpace` owns its cells in an arena indexed by `CellId`.  Regions,
//! neighborhoods, and agents refer to cells only through `CellId` handles, so
//! removing a cell never leaves a dangling reference: a stale handle simply
//! resolves to `None`.
//!
//! Spaces themselves are shared between the environment that owns them and
//! the agents and messages acting on them through a [`SpaceRef`]
//! (`Rc<RefCell<CellularSpace>>`).  The kernel is single-threaded, so no
//! locking is involved.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Parallel snapshot copy in `CellularSpace::synchronize`.    |
//! | `fx-hash`  | FxHash for the per-cell control-mode map.                  |
//! | `serde`    | Derives `Serialize`/`Deserialize` on value types.          |

pub mod cell;
pub mod error;
pub mod index;
pub mod neighborhood;
pub mod region;
pub mod space;
pub mod state;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

pub use cell::Cell;
pub use error::{SpatialError, SpatialResult};
pub use index::CellIndex;
pub use neighborhood::{Neighbor, Neighborhood};
pub use region::Region;
pub use space::{CellularSpace, StructuralChange};
pub use state::{CellState, SyncScope, Value};

/// Shared handle to a cellular space.
pub type SpaceRef = Rc<RefCell<CellularSpace>>;
