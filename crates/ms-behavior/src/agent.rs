//! The `Agent` trait and the state shared by both agent kinds.

use tracing::{error, warn};

use ms_core::{AgentId, CellId, Event, FailurePolicy, KernelConfig, ModeId};
use ms_spatial::{CellularSpace, Region, SpaceRef};

use crate::{BehaviorError, BehaviorResult, ControlMode, ModeSet, Outcome, RuleError};

// ── ActionRegion ──────────────────────────────────────────────────────────────

/// The cells of one space an agent applies its rules to.
#[derive(Clone, Debug)]
pub struct ActionRegion {
    space:  SpaceRef,
    /// `None` covers every cell of the space at execution time.
    region: Option<Region>,
}

impl ActionRegion {
    pub fn new(space: &SpaceRef, region: Region) -> Self {
        Self { space: SpaceRef::clone(space), region: Some(region) }
    }

    /// Every cell of `space`, including cells added after this call.
    pub fn whole(space: &SpaceRef) -> Self {
        Self { space: SpaceRef::clone(space), region: None }
    }

    pub fn space(&self) -> &SpaceRef {
        &self.space
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Cells to visit, in region iteration order.
    pub(crate) fn cells(&self, space: &CellularSpace) -> Vec<CellId> {
        match &self.region {
            Some(region) => region.cells().collect(),
            None => space.cell_ids(),
        }
    }
}

// ── RuleFailure ───────────────────────────────────────────────────────────────

/// A rule failure that was logged and absorbed under
/// [`FailurePolicy::Continue`].
#[derive(Clone, Debug, PartialEq)]
pub struct RuleFailure {
    pub time:  f64,
    pub mode:  String,
    pub cell:  Option<CellId>,
    pub error: RuleError,
}

// ── AgentCore ─────────────────────────────────────────────────────────────────

/// Identity, control modes, action regions, and diagnostics common to
/// [`GlobalAgent`](crate::GlobalAgent) and [`LocalAgent`](crate::LocalAgent).
#[derive(Debug)]
pub struct AgentCore {
    id:   AgentId,
    name: String,

    pub(crate) modes:           ModeSet,
    pub(crate) regions:         Vec<ActionRegion>,
    pub(crate) regions_enabled: bool,

    failure_policy: FailurePolicy,
    max_jump_chain: usize,
    failures:       Vec<RuleFailure>,
}

impl AgentCore {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        let defaults = KernelConfig::default();
        Self {
            id,
            name: name.into(),
            modes: ModeSet::new(),
            regions: Vec::new(),
            regions_enabled: false,
            failure_policy: defaults.failure_policy,
            max_jump_chain: defaults.max_jump_chain,
            failures: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    pub fn regions(&self) -> &[ActionRegion] {
        &self.regions
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn max_jump_chain(&self) -> usize {
        self.max_jump_chain
    }

    /// Action regions are in effect only when enabled and non-empty.
    pub fn regions_active(&self) -> bool {
        self.regions_enabled && !self.regions.is_empty()
    }

    pub(crate) fn ensure_runnable(&self) -> BehaviorResult<()> {
        if self.modes.is_empty() {
            return Err(BehaviorError::NoControlModes(self.id));
        }
        if !self.modes.is_built() {
            return Err(BehaviorError::NotBuilt(self.id));
        }
        Ok(())
    }

    fn mode_name(&self, mode: ModeId) -> String {
        self.modes
            .get(mode)
            .map(|m| m.name().to_owned())
            .unwrap_or_else(|| mode.to_string())
    }

    /// Turn the outcome of one control-mode pass into "jump to" or "done".
    ///
    /// Failures are absorbed (logged and recorded) under
    /// `FailurePolicy::Continue` and returned as errors under `Halt`.
    pub(crate) fn settle(
        &mut self,
        outcome: Outcome,
        event:   &Event,
        mode:    ModeId,
        cell:    Option<CellId>,
    ) -> BehaviorResult<Option<ModeId>> {
        match outcome {
            Outcome::Continue => Ok(None),
            Outcome::Jumped(target) => Ok(Some(target)),
            Outcome::Failed(source) => {
                let mode = self.mode_name(mode);
                match self.failure_policy {
                    FailurePolicy::Continue => {
                        warn!(
                            agent = %self.id,
                            mode  = %mode,
                            time  = event.time(),
                            cell  = ?cell,
                            error = %source,
                            "rule failed; treating control mode as completed"
                        );
                        self.failures.push(RuleFailure {
                            time: event.time(),
                            mode,
                            cell,
                            error: source,
                        });
                        Ok(None)
                    }
                    FailurePolicy::Halt => {
                        Err(BehaviorError::RuleFailed { agent: self.id, mode, source })
                    }
                }
            }
        }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// A behavior owner driven by scheduler messages.
///
/// Implementors only expose their [`AgentCore`] and define `execute`; the
/// registration and build surface is shared.
pub trait Agent {
    fn core(&self) -> &AgentCore;

    fn core_mut(&mut self) -> &mut AgentCore;

    /// Run the agent's rules for one event.
    fn execute(&mut self, event: &Event) -> BehaviorResult<()>;

    fn id(&self) -> AgentId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    /// Register a control mode.  The first one registered is the initial mode.
    fn add_control_mode(&mut self, mode: ControlMode) -> ModeId {
        self.core_mut().modes.add(mode)
    }

    /// Resolve jump targets, returning the first unresolved one as an error.
    fn try_build(&mut self) -> BehaviorResult<()> {
        let id = self.id();
        self.core_mut().modes.build(id)
    }

    /// Resolve jump targets.  `false` means the agent is only partially
    /// configured and must not be run.
    fn build(&mut self) -> bool {
        match self.try_build() {
            Ok(()) => true,
            Err(e) => {
                error!(agent = %self.id(), error = %e, "agent build failed");
                false
            }
        }
    }

    /// Add an action region and enable action regions.
    fn add_region(&mut self, region: ActionRegion) {
        let core = self.core_mut();
        core.regions.push(region);
        core.regions_enabled = true;
    }

    fn set_regions_enabled(&mut self, enabled: bool) {
        self.core_mut().regions_enabled = enabled;
    }

    /// Drain the diagnostics buffer of absorbed rule failures.
    fn take_failures(&mut self) -> Vec<RuleFailure> {
        std::mem::take(&mut self.core_mut().failures)
    }

    /// Adopt the agent-level settings of `config`.
    fn configure(&mut self, config: &KernelConfig) {
        let core = self.core_mut();
        core.failure_policy = config.failure_policy;
        core.max_jump_chain = config.max_jump_chain;
    }
}
