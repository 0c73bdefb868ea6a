//! Control modes, processes, and the outcome of running them.

use std::collections::HashMap;

use tracing::trace;

use ms_core::{AgentId, Event, ModeId};

use crate::{AgentView, BehaviorError, BehaviorResult, FlowCondition, JumpCondition, RuleError, Site};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Result of running a [`Process`] or a [`ControlMode`].
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Every process ran to the end without a jump.
    Continue,
    /// A jump condition fired; the payload is its resolved target.
    Jumped(ModeId),
    /// A rule failed.  The pass stopped at the failing process.
    Failed(RuleError),
}

impl Outcome {
    /// `true` unless a jump occurred.  A failed pass counts as complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !matches!(self, Outcome::Jumped(_))
    }
}

// ── Process ───────────────────────────────────────────────────────────────────

/// An ordered group of jump conditions followed by flow conditions.
#[derive(Debug, Default)]
pub struct Process {
    jumps: Vec<JumpCondition>,
    flows: Vec<FlowCondition>,
}

impl Process {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jump(mut self, condition: JumpCondition) -> Self {
        self.jumps.push(condition);
        self
    }

    pub fn flow(mut self, condition: FlowCondition) -> Self {
        self.flows.push(condition);
        self
    }

    pub fn add_jump(&mut self, condition: JumpCondition) {
        self.jumps.push(condition);
    }

    pub fn add_flow(&mut self, condition: FlowCondition) {
        self.flows.push(condition);
    }

    pub fn jumps(&self) -> &[JumpCondition] {
        &self.jumps
    }

    pub fn flows(&self) -> &[FlowCondition] {
        &self.flows
    }

    /// The first jump condition that fires ends the process with
    /// [`Outcome::Jumped`].  If none fires, every flow condition runs; a flow
    /// condition's flag does not stop the others.
    pub fn execute(
        &mut self,
        event:    &Event,
        agent:    &AgentView,
        mut site: Option<&mut Site<'_>>,
    ) -> Outcome {
        for jump in &mut self.jumps {
            match jump.evaluate(event, agent, site.as_mut().map(|s| &mut **s)) {
                Ok(true) => {
                    return match jump.target() {
                        Some(target) => {
                            trace!(
                                agent  = %agent.id,
                                from   = %agent.mode,
                                to     = %target,
                                time   = event.time(),
                                "jump condition fired"
                            );
                            Outcome::Jumped(target)
                        }
                        None => Outcome::Failed(RuleError::UnresolvedTarget(
                            jump.target_name().to_owned(),
                        )),
                    };
                }
                Ok(false) => {}
                Err(e) => return Outcome::Failed(e),
            }
        }

        for flow in &mut self.flows {
            if let Err(e) = flow.evaluate(event, agent, site.as_mut().map(|s| &mut **s)) {
                return Outcome::Failed(e);
            }
        }
        Outcome::Continue
    }
}

// ── ControlMode ───────────────────────────────────────────────────────────────

/// A named state of an agent's automaton.
#[derive(Debug)]
pub struct ControlMode {
    name:      String,
    processes: Vec<Process>,
}

impl ControlMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), processes: Vec::new() }
    }

    pub fn process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    pub fn add_process(&mut self, process: Process) {
        self.processes.push(process);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Run the processes in registration order, stopping at the first one
    /// that jumps or fails.
    pub fn execute(
        &mut self,
        event:    &Event,
        agent:    &AgentView,
        mut site: Option<&mut Site<'_>>,
    ) -> Outcome {
        for process in &mut self.processes {
            let outcome = process.execute(event, agent, site.as_mut().map(|s| &mut **s));
            if outcome != Outcome::Continue {
                return outcome;
            }
        }
        Outcome::Continue
    }
}

// ── ModeSet ───────────────────────────────────────────────────────────────────

/// An agent's control modes, addressed by [`ModeId`] in registration order.
#[derive(Debug, Default)]
pub struct ModeSet {
    modes: Vec<ControlMode>,
    built: bool,
}

impl ModeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode.  Adding a mode invalidates any previous build.
    pub fn add(&mut self, mode: ControlMode) -> ModeId {
        let id = ModeId(self.modes.len() as u16);
        self.modes.push(mode);
        self.built = false;
        id
    }

    pub fn get(&self, id: ModeId) -> Option<&ControlMode> {
        self.modes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ModeId) -> Option<&mut ControlMode> {
        self.modes.get_mut(id.index())
    }

    /// First mode registered under `name`.
    pub fn by_name(&self, name: &str) -> Option<ModeId> {
        self.modes
            .iter()
            .position(|m| m.name == name)
            .map(|i| ModeId(i as u16))
    }

    /// The mode new cells and new global agents start in.
    pub fn first(&self) -> Option<ModeId> {
        (!self.modes.is_empty()).then_some(ModeId::FIRST)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModeId, &ControlMode)> + '_ {
        self.modes.iter().enumerate().map(|(i, m)| (ModeId(i as u16), m))
    }

    /// Resolve every jump target name against this set.
    ///
    /// Stops at the first unknown name.  Targets resolved before that point
    /// keep their resolution, so a failed set is partially configured and
    /// must not be run.
    pub fn build(&mut self, agent: AgentId) -> BehaviorResult<()> {
        self.built = false;

        let mut names: HashMap<String, ModeId> = HashMap::with_capacity(self.modes.len());
        for (i, mode) in self.modes.iter().enumerate() {
            names.entry(mode.name.clone()).or_insert(ModeId(i as u16));
        }

        for mode in &mut self.modes {
            for process in &mut mode.processes {
                for jump in &mut process.jumps {
                    let Some(&target) = names.get(jump.target_name()) else {
                        return Err(BehaviorError::UnresolvedTarget {
                            agent,
                            mode:   mode.name.clone(),
                            target: jump.target_name().to_owned(),
                        });
                    };
                    jump.resolve(target);
                }
            }
        }

        self.built = true;
        Ok(())
    }
}
