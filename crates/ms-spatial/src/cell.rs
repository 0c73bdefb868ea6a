//! `Cell`: the addressable simulation unit.
//!
//! # Synchronous update
//!
//! A cell carries two [`CellState`]s: `current`, which rules read and write
//! during a pass, and `past`, a snapshot taken by [`Cell::synchronize`].  A
//! rule that reads neighbors through `past` sees the values from before the
//! pass started, no matter in which order the pass visits cells:
//!
//! ```text
//! space.synchronize(SyncScope::All);   // past := current, for every cell
//! for cell in space:                    // rules read past, write current
//!     agent.execute(cell)
//! ```

use std::collections::BTreeMap;

use ms_core::{AgentId, CellId, ModeId};

use crate::{CellIndex, CellState, Neighborhood, SyncScope, Value};

#[cfg(feature = "fx-hash")]
type ModeMap = rustc_hash::FxHashMap<AgentId, ModeId>;
#[cfg(not(feature = "fx-hash"))]
type ModeMap = std::collections::HashMap<AgentId, ModeId>;

/// One cell of a [`CellularSpace`](crate::CellularSpace).
#[derive(Clone, Debug)]
pub struct Cell {
    id:    CellId,
    index: CellIndex,

    /// Steps since this cell's tracked control mode last changed.
    latency: u64,

    current: CellState,
    past:    Option<CellState>,

    /// The cell's own discrete state for every local agent tracking it.
    modes: ModeMap,

    neighborhoods: BTreeMap<String, Neighborhood>,
}

impl Cell {
    pub fn new(id: CellId, index: CellIndex) -> Self {
        Self::with_state(id, index, CellState::new())
    }

    pub fn with_state(id: CellId, index: CellIndex, state: CellState) -> Self {
        Self {
            id,
            index,
            latency: 0,
            current: state,
            past: None,
            modes: ModeMap::default(),
            neighborhoods: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.index
    }

    // ── Attributes ────────────────────────────────────────────────────────

    pub fn state(&self) -> &CellState {
        &self.current
    }

    pub fn state_mut(&mut self) -> &mut CellState {
        &mut self.current
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.current.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.current.set(name, value)
    }

    /// The snapshot from the last `synchronize`, or `None` before the first.
    pub fn past(&self) -> Option<&CellState> {
        self.past.as_ref()
    }

    /// The past snapshot if one exists, otherwise the current state.
    pub fn past_or_current(&self) -> &CellState {
        self.past.as_ref().unwrap_or(&self.current)
    }

    /// Commit the current attributes into the past snapshot.
    ///
    /// The first call allocates the snapshot; later calls overwrite it in
    /// place.  With [`SyncScope::Only`] only the listed attributes are copied.
    pub fn synchronize(&mut self, scope: SyncScope<'_>) {
        match scope {
            SyncScope::All => match self.past.as_mut() {
                Some(past) => past.clone_from(&self.current),
                None => self.past = Some(self.current.clone()),
            },
            SyncScope::Only(names) => {
                let past = self.past.get_or_insert_with(CellState::new);
                past.copy_selected(&self.current, names);
            }
        }
    }

    // ── Latency ───────────────────────────────────────────────────────────

    #[inline]
    pub fn latency(&self) -> u64 {
        self.latency
    }

    pub fn set_latency(&mut self, latency: u64) {
        self.latency = latency;
    }

    /// Count one more step without a mode change.
    pub fn tick_latency(&mut self) {
        self.latency += 1;
    }

    // ── Per-agent control modes ───────────────────────────────────────────

    /// Track `mode` as this cell's current mode for `agent`, replacing any
    /// existing entry.  Resets latency when the mode actually changes.
    pub fn attach_control_mode(&mut self, agent: AgentId, mode: ModeId) -> Option<ModeId> {
        let previous = self.modes.insert(agent, mode);
        if previous != Some(mode) {
            self.latency = 0;
        }
        previous
    }

    /// Stop tracking `agent`.  Returns `false` if it was not tracked.
    pub fn detach_control_mode(&mut self, agent: AgentId) -> bool {
        self.modes.remove(&agent).is_some()
    }

    /// The mode this cell currently tracks for `agent`.
    #[inline]
    pub fn control_mode(&self, agent: AgentId) -> Option<ModeId> {
        self.modes.get(&agent).copied()
    }

    /// Agents tracked by this cell, in ascending id order.
    pub fn tracked_agents(&self) -> Vec<AgentId> {
        let mut agents: Vec<AgentId> = self.modes.keys().copied().collect();
        agents.sort_unstable();
        agents
    }

    // ── Neighborhoods ─────────────────────────────────────────────────────

    /// Install `neighborhood` under `name`, re-parenting it to this cell.
    pub fn add_neighborhood(&mut self, name: impl Into<String>, mut neighborhood: Neighborhood) {
        neighborhood.set_parent(self.id);
        self.neighborhoods.insert(name.into(), neighborhood);
    }

    pub fn neighborhood(&self, name: &str) -> Option<&Neighborhood> {
        self.neighborhoods.get(name)
    }

    pub fn neighborhood_mut(&mut self, name: &str) -> Option<&mut Neighborhood> {
        self.neighborhoods.get_mut(name)
    }

    /// The neighborhood named `name`, created empty if missing.
    pub fn neighborhood_entry(&mut self, name: &str) -> &mut Neighborhood {
        let id = self.id;
        self.neighborhoods
            .entry(name.to_owned())
            .or_insert_with(|| Neighborhood::new(id))
    }

    pub fn remove_neighborhood(&mut self, name: &str) -> Option<Neighborhood> {
        self.neighborhoods.remove(name)
    }

    pub fn neighborhood_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.neighborhoods.keys().map(String::as_str)
    }

    pub(crate) fn neighborhoods_mut(&mut self) -> impl Iterator<Item = &mut Neighborhood> + '_ {
        self.neighborhoods.values_mut()
    }
}
