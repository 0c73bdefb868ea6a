//! `ms-behavior`: hybrid automaton agents.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`site`]    | `Site<'a>` (the cell a rule acts on), `AgentView`, `AgentKind`  |
//! | [`rule`]    | `Rule` trait, `JumpCondition`, `FlowCondition`                  |
//! | [`mode`]    | `Process`, `ControlMode`, `ModeSet`, `Outcome`                  |
//! | [`agent`]   | `Agent` trait, `AgentCore`, `ActionRegion`, `RuleFailure`       |
//! | [`global`]  | `GlobalAgent`: one shared state machine                        |
//! | [`local`]   | `LocalAgent`: one state machine instance per cell              |
//! | [`error`]   | `RuleError`, `BehaviorError`, `BehaviorResult<T>`               |
//!
//! # Execution model
//!
//! ```text
//! ControlMode  = [Process]
//! Process      = [JumpCondition] then [FlowCondition]
//!
//! Process::execute:
//!   first JumpCondition whose rule returns true  → Jumped(target)
//!   otherwise every FlowCondition runs            → Continue
//! ControlMode::execute:
//!   Processes in order; stop at the first Jumped or Failed
//! ```
//!
//! A `GlobalAgent` re-runs its (new) current mode after every jump within the
//! same event, so chains of transitions settle before control returns to the
//! scheduler.  A `LocalAgent` records the jump in the cell and moves on; the
//! new mode runs the next time that cell is visited.
//!
//! Rule failures never stop a simulation by default: they are logged through
//! `tracing`, kept in the agent's diagnostics buffer, and the mode counts as
//! completed.  `FailurePolicy::Halt` turns them into errors instead.

use std::cell::RefCell;
use std::rc::Rc;

pub mod agent;
pub mod error;
pub mod global;
pub mod local;
pub mod mode;
pub mod rule;
pub mod site;


pub use agent::{ActionRegion, Agent, AgentCore, RuleFailure};
pub use error::{BehaviorError, BehaviorResult, RuleError, RuleResult};
pub use global::GlobalAgent;
pub use local::LocalAgent;
pub use mode::{ControlMode, ModeSet, Outcome, Process};
pub use rule::{FlowCondition, JumpCondition, Rule};
pub use site::{AgentKind, AgentView, Site};

/// Shared handle to a local agent.
pub type LocalAgentRef = Rc<RefCell<LocalAgent>>;

/// Shared handle to a global agent.
pub type GlobalAgentRef = Rc<RefCell<GlobalAgent>>;
