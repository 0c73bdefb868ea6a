use thiserror::Error;

use ms_behavior::BehaviorError;
use ms_core::{AgentId, CoreError};
use ms_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("environment configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("agent {0} is already registered in this environment")]
    DuplicateAgent(AgentId),

    #[error("an agent is borrowed elsewhere and cannot be registered")]
    AgentBorrowed,

    #[error("cellular space #{0} is borrowed elsewhere")]
    SpaceBorrowed(usize),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type SimResult<T> = Result<T, SimError>;
