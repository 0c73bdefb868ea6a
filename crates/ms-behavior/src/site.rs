//! What a rule sees when it runs: the agent it belongs to and, for agents
//! acting over space, the cell it is acting on.

use ms_core::{AgentId, CellId, ModeId};
use ms_spatial::{
    Cell, CellIndex, CellState, CellularSpace, Neighbor, StructuralChange, Value,
};

use crate::{RuleError, RuleResult};

// ── AgentView ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Global,
    Local,
}

/// Read-only snapshot of the agent running a rule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentView {
    pub id:   AgentId,
    pub kind: AgentKind,
    /// The control mode being executed.
    pub mode: ModeId,
    /// Simulated time of the agent's last mode change.  Only global agents
    /// track this; local agents keep a per-cell latency instead.
    pub last_change: Option<f64>,
}

// ── Site ──────────────────────────────────────────────────────────────────────

/// A cell together with mutable access to the space that owns it.
///
/// Rules get a `Site` when their agent acts over an action region.  The whole
/// space is reachable so that a rule can read neighbors, update space-wide
/// attributes, and queue structural changes.  Cells must not be added or
/// removed directly during a pass; use [`Site::defer`].
pub struct Site<'a> {
    space: &'a mut CellularSpace,
    index: CellIndex,
    cell:  CellId,
}

impl<'a> Site<'a> {
    /// Returns `None` if `cell` is not (or no longer) part of `space`.
    pub fn new(space: &'a mut CellularSpace, cell: CellId) -> Option<Self> {
        let index = space.cell(cell)?.index();
        Some(Self { space, index, cell })
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.index
    }

    #[inline]
    pub fn cell_id(&self) -> CellId {
        self.cell
    }

    pub fn cell(&self) -> Option<&Cell> {
        self.space.cell(self.cell)
    }

    pub fn cell_mut(&mut self) -> Option<&mut Cell> {
        self.space.cell_mut(self.cell)
    }

    pub fn space(&self) -> &CellularSpace {
        &*self.space
    }

    pub fn space_mut(&mut self) -> &mut CellularSpace {
        &mut *self.space
    }

    // ── Attributes ────────────────────────────────────────────────────────

    /// Current value of attribute `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cell()?.get(name)
    }

    /// Current numeric attribute, or `MissingAttribute`.
    pub fn number(&self, name: &str) -> RuleResult<f64> {
        self.get(name)
            .and_then(Value::as_number)
            .ok_or_else(|| RuleError::MissingAttribute(name.to_owned()))
    }

    /// Current boolean attribute, or `MissingAttribute`.
    pub fn flag(&self, name: &str) -> RuleResult<bool> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| RuleError::MissingAttribute(name.to_owned()))
    }

    /// The cell's last synchronized snapshot, or its current state if it was
    /// never synchronized.
    pub fn past_state(&self) -> Option<&CellState> {
        self.cell().map(Cell::past_or_current)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> RuleResult<Option<Value>> {
        let id = self.cell;
        let cell = self.cell_mut().ok_or(RuleError::CellGone(id))?;
        Ok(cell.set(name, value))
    }

    // ── Neighbors ─────────────────────────────────────────────────────────

    /// Links of neighborhood `name`, in position order.  Empty if the cell
    /// has no such neighborhood.
    pub fn neighbors(&self, name: &str) -> Vec<Neighbor> {
        self.cell()
            .and_then(|c| c.neighborhood(name))
            .map(|n| n.iter().map(|(_, nb)| *nb).collect())
            .unwrap_or_default()
    }

    /// Number of live neighbors in `name` whose synchronized state satisfies
    /// `pred`.
    pub fn count_neighbors<F>(&self, name: &str, mut pred: F) -> usize
    where
        F: FnMut(&CellState) -> bool,
    {
        let Some(hood) = self.cell().and_then(|c| c.neighborhood(name)) else {
            return 0;
        };
        hood.cells()
            .filter_map(|id| self.space.cell(id))
            .filter(|c| pred(c.past_or_current()))
            .count()
    }

    /// Queue a structural change for the space's next `update()`.
    pub fn defer(&mut self, change: StructuralChange) {
        self.space.defer(change);
    }
}
