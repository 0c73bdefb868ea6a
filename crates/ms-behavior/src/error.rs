use thiserror::Error;

use ms_core::{AgentId, CellId, ModeId};

/// Why a rule could not complete.
///
/// Returned by [`Rule::execute`](crate::Rule::execute).  By default the kernel
/// logs it and carries on; see `FailurePolicy`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("{0}")]
    Failed(String),

    #[error("attribute {0:?} is missing or has the wrong type")]
    MissingAttribute(String),

    #[error("rule needs a cell but was run without one")]
    NoSite,

    #[error("cell {0} no longer exists")]
    CellGone(CellId),

    #[error("jump target {0:?} was never resolved; call build() first")]
    UnresolvedTarget(String),
}

impl RuleError {
    pub fn failed(reason: impl Into<String>) -> Self {
        RuleError::Failed(reason.into())
    }
}

pub type RuleResult<T> = Result<T, RuleError>;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("agent {agent}: control mode {mode:?} jumps to unknown control mode {target:?}")]
    UnresolvedTarget {
        agent:  AgentId,
        mode:   String,
        target: String,
    },

    #[error("agent {0} has no control modes")]
    NoControlModes(AgentId),

    #[error("agent {0} must be built before it runs")]
    NotBuilt(AgentId),

    #[error("agent {agent} has no control mode {mode}")]
    UnknownMode { agent: AgentId, mode: ModeId },

    #[error("agent {agent}, control mode {mode:?}: rule failed: {source}")]
    RuleFailed {
        agent:  AgentId,
        mode:   String,
        #[source]
        source: RuleError,
    },

    #[error("agent {agent} chained more than {limit} jumps within one event")]
    JumpChainLimit { agent: AgentId, limit: usize },

    #[error("agent {0}: cellular space is already borrowed elsewhere")]
    SpaceBorrowed(AgentId),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
