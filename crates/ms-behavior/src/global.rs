//! `GlobalAgent`: a single automaton shared by the whole simulation.

use std::rc::Rc;

use ms_core::{AgentId, Event, ModeId};

use crate::{Agent, AgentCore, AgentKind, AgentView, BehaviorError, BehaviorResult, ControlMode, Site};

/// An agent with one current control mode.
///
/// After a jump the new mode runs immediately within the same event, so a
/// chain of transitions settles before `execute` returns.  The chain length
/// is bounded by `max_jump_chain`.
#[derive(Debug)]
pub struct GlobalAgent {
    core:        AgentCore,
    current:     ModeId,
    last_change: f64,
}

impl GlobalAgent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self { core: AgentCore::new(id, name), current: ModeId::FIRST, last_change: 0.0 }
    }

    #[inline]
    pub fn current(&self) -> ModeId {
        self.current
    }

    pub fn current_mode(&self) -> Option<&ControlMode> {
        self.core.modes.get(self.current)
    }

    /// Simulated time of the last mode change.
    pub fn last_change(&self) -> f64 {
        self.last_change
    }

    /// Make `target` the current mode.  Does nothing (and returns `false`)
    /// when `target` already is the current mode.
    pub fn jump(&mut self, event: &Event, target: ModeId) -> bool {
        if target == self.current {
            return false;
        }
        self.current = target;
        self.last_change = event.time();
        true
    }

    fn view(&self) -> AgentView {
        AgentView {
            id:          self.core.id(),
            kind:        AgentKind::Global,
            mode:        self.current,
            last_change: Some(self.last_change),
        }
    }

    /// Run the current mode until a pass completes without a jump.
    fn run_chain(&mut self, event: &Event, mut site: Option<&mut Site<'_>>) -> BehaviorResult<()> {
        let agent = self.core.id();
        let cell = site.as_ref().map(|s| s.cell_id());
        let mut jumps = 0usize;

        loop {
            let view = self.view();
            let mode = self
                .core
                .modes
                .get_mut(self.current)
                .ok_or(BehaviorError::UnknownMode { agent, mode: self.current })?;
            let outcome = mode.execute(event, &view, site.as_mut().map(|s| &mut **s));

            let Some(target) = self.core.settle(outcome, event, self.current, cell)? else {
                return Ok(());
            };
            self.jump(event, target);

            jumps += 1;
            if jumps > self.core.max_jump_chain() {
                return Err(BehaviorError::JumpChainLimit {
                    agent,
                    limit: self.core.max_jump_chain(),
                });
            }
        }
    }
}

impl Agent for GlobalAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn execute(&mut self, event: &Event) -> BehaviorResult<()> {
        self.core.ensure_runnable()?;

        if !self.core.regions_active() {
            return self.run_chain(event, None);
        }

        let agent = self.core.id();
        for r in 0..self.core.regions.len() {
            let handle = Rc::clone(self.core.regions[r].space());
            let mut space = handle
                .try_borrow_mut()
                .map_err(|_| BehaviorError::SpaceBorrowed(agent))?;
            let cells = self.core.regions[r].cells(&space);

            for cell in cells {
                let Some(mut site) = Site::new(&mut space, cell) else {
                    continue;
                };
                self.run_chain(event, Some(&mut site))?;
            }
        }
        Ok(())
    }
}
