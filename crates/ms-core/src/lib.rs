//! `ms-core`: foundational types for the multi-scale simulation kernel.
//!
//! This crate is a dependency of every other `ms-*` crate.  It has no `ms-*`
//! dependencies and minimal external ones (`rand` and `thiserror`, plus
//! optional `serde`/`toml`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `CellId`, `ModeId`                         |
//! | [`time`]        | `Event`: the `(time, period, priority)` scheduling key |
//! | [`config`]      | `KernelConfig`, `FailurePolicy`                       |
//! | [`rng`]         | `SimRng` (model-setup randomness)                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public types and enables |
//!           | `KernelConfig::from_toml_str`.                             |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FailurePolicy, KernelConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, CellId, ModeId};
pub use rng::SimRng;
pub use time::Event;
