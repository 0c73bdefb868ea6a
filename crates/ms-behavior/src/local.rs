//! `LocalAgent`: one automaton instance per cell, sharing rule definitions.

use std::rc::Rc;

use ms_core::{AgentId, CellId, Event};
use ms_spatial::{CellularSpace, SpaceRef};

use crate::{Agent, AgentCore, AgentKind, AgentView, BehaviorError, BehaviorResult, Site};

/// An agent whose current control mode is stored in each cell.
///
/// Each execution visits every cell once and runs the mode that cell
/// currently tracks for this agent.  A jump re-attaches the cell to the
/// target mode; the target runs on the next visit, not within the same
/// event.
#[derive(Debug)]
pub struct LocalAgent {
    core:   AgentCore,
    spaces: Vec<SpaceRef>,
}

impl LocalAgent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self { core: AgentCore::new(id, name), spaces: Vec::new() }
    }

    /// Attach the first control mode to every cell currently in `space` and
    /// remember the space.  Returns the number of cells attached.
    ///
    /// Cells added to the space later are not tracked until the space is
    /// attached again.
    pub fn attach_space(&mut self, space: &SpaceRef) -> BehaviorResult<usize> {
        let agent = self.core.id();
        let first = self
            .core
            .modes
            .first()
            .ok_or(BehaviorError::NoControlModes(agent))?;
        let attached = space
            .try_borrow_mut()
            .map_err(|_| BehaviorError::SpaceBorrowed(agent))?
            .attach_agent(agent, first);

        if !self.spaces.iter().any(|s| Rc::ptr_eq(s, space)) {
            self.spaces.push(SpaceRef::clone(space));
        }
        Ok(attached)
    }

    /// Stop tracking this agent in every cell of `space` and forget the space.
    pub fn detach_space(&mut self, space: &SpaceRef) -> BehaviorResult<usize> {
        let agent = self.core.id();
        let detached = space
            .try_borrow_mut()
            .map_err(|_| BehaviorError::SpaceBorrowed(agent))?
            .detach_agent(agent);
        self.spaces.retain(|s| !Rc::ptr_eq(s, space));
        Ok(detached)
    }

    pub fn spaces(&self) -> &[SpaceRef] {
        &self.spaces
    }

    fn run_cells(&mut self, event: &Event, space: &mut CellularSpace, cells: &[CellId]) -> BehaviorResult<()> {
        let agent = self.core.id();

        for &cell in cells {
            let Some(mode) = space.cell(cell).and_then(|c| c.control_mode(agent)) else {
                continue;
            };
            let Some(mut site) = Site::new(space, cell) else {
                continue;
            };
            let view = AgentView { id: agent, kind: AgentKind::Local, mode, last_change: None };
            let control = self
                .core
                .modes
                .get_mut(mode)
                .ok_or(BehaviorError::UnknownMode { agent, mode })?;
            let outcome = control.execute(event, &view, Some(&mut site));

            let next = self.core.settle(outcome, event, mode, Some(cell))?;
            let Some(cell) = space.cell_mut(cell) else {
                continue;
            };
            match next {
                Some(target) if target != mode => {
                    cell.attach_control_mode(agent, target);
                }
                _ => cell.tick_latency(),
            }
        }
        Ok(())
    }
}

impl Agent for LocalAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn execute(&mut self, event: &Event) -> BehaviorResult<()> {
        self.core.ensure_runnable()?;
        let agent = self.core.id();

        if self.core.regions_active() {
            for r in 0..self.core.regions.len() {
                let handle = Rc::clone(self.core.regions[r].space());
                let mut space = handle
                    .try_borrow_mut()
                    .map_err(|_| BehaviorError::SpaceBorrowed(agent))?;
                let cells = self.core.regions[r].cells(&space);
                self.run_cells(event, &mut space, &cells)?;
            }
        } else {
            for s in 0..self.spaces.len() {
                let handle = Rc::clone(&self.spaces[s]);
                let mut space = handle
                    .try_borrow_mut()
                    .map_err(|_| BehaviorError::SpaceBorrowed(agent))?;
                let cells = space.cell_ids();
                self.run_cells(event, &mut space, &cells)?;
            }
        }
        Ok(())
    }
}
