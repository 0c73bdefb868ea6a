//! `CellularSpace`: the container of cells.
//!
//! # Data layout
//!
//! Cells live in an arena (`Vec<Option<Cell>>`) indexed by `CellId`.  A
//! removed cell leaves a `None` slot behind; slots are never reused, so a
//! stale `CellId` held by a region or neighborhood resolves to `None` rather
//! than to some other cell.
//!
//! Alongside the arena the space keeps:
//!
//! - a [`Region`] over every live cell (position → handle, duplicates allowed),
//!   which fixes the iteration order of the space;
//! - an R-tree (via `rstar`) over cell positions for nearest-cell queries;
//! - a queue of deferred [`StructuralChange`]s, applied by [`update`].
//!
//! [`update`]: CellularSpace::update

use std::collections::VecDeque;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ms_core::{AgentId, CellId, ModeId};

use crate::{
    Cell, CellIndex, CellState, Neighborhood, Region, SpatialError, SpatialResult, SyncScope,
};

// ── R-tree cell entry ─────────────────────────────────────────────────────────

#[derive(Clone, PartialEq)]
struct CellEntry {
    point: [f64; 2], // [x, y]
    id:    CellId,
}

impl RTreeObject for CellEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CellEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── StructuralChange ──────────────────────────────────────────────────────────

/// A change to the shape of a space, queued with [`CellularSpace::defer`]
/// while a pass over the cells is in progress and applied by
/// [`CellularSpace::update`].
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralChange {
    AddCell { index: CellIndex, state: CellState },
    RemoveCell(CellId),
    Link { from: CellId, neighborhood: String, to: CellId, weight: f64 },
    Unlink { from: CellId, neighborhood: String, to: CellIndex },
}

// ── CellularSpace ─────────────────────────────────────────────────────────────

/// A set of cells plus the spatial indexes over them.
///
/// A space also carries its own attribute block ([`attributes`]) for
/// space-wide values such as counters or parameters.
///
/// [`attributes`]: CellularSpace::attributes
pub struct CellularSpace {
    name:        String,
    cells:       Vec<Option<Cell>>,
    region:      Region,
    attributes:  CellState,
    pending:     VecDeque<StructuralChange>,
    spatial_idx: RTree<CellEntry>,
}

impl std::fmt::Debug for CellularSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellularSpace")
            .field("name", &self.name)
            .field("cells", &self.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl CellularSpace {
    /// An empty space.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            cells:       Vec::new(),
            region:      Region::new(),
            attributes:  CellState::new(),
            pending:     VecDeque::new(),
            spatial_idx: RTree::new(),
        }
    }

    /// A `x_dim × y_dim` grid with indices `(0, 0) ..= (x_dim-1, y_dim-1)`.
    ///
    /// Cells are created in `x`-major order, so `CellId`s follow the same
    /// order as iteration over the space.
    pub fn grid(name: impl Into<String>, x_dim: u32, y_dim: u32) -> SpatialResult<Self> {
        if x_dim == 0 || y_dim == 0 || x_dim > i32::MAX as u32 || y_dim > i32::MAX as u32 {
            return Err(SpatialError::InvalidGrid { x_dim, y_dim });
        }
        let mut space = Self::new(name);
        let count = x_dim as usize * y_dim as usize;
        space.cells.reserve(count);

        let mut entries = Vec::with_capacity(count);
        for x in 0..x_dim as i32 {
            for y in 0..y_dim as i32 {
                let index = CellIndex::new(x, y);
                let id = CellId(space.cells.len() as u32);
                space.cells.push(Some(Cell::new(id, index)));
                space.region.add(index, id);
                entries.push(CellEntry { point: index.point(), id });
            }
        }
        // Bulk-load for O(N log N) construction (faster than N inserts).
        space.spatial_idx = RTree::bulk_load(entries);
        Ok(space)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wrap the space in a shared [`SpaceRef`](crate::SpaceRef) handle.
    pub fn into_ref(self) -> crate::SpaceRef {
        std::rc::Rc::new(std::cell::RefCell::new(self))
    }

    // ── Cells ─────────────────────────────────────────────────────────────

    /// Add an empty cell at `index`.  Duplicate indices are allowed.
    pub fn add_cell(&mut self, index: CellIndex) -> CellId {
        self.add_cell_with(index, CellState::new())
    }

    /// Add a cell at `index` with initial attributes.
    pub fn add_cell_with(&mut self, index: CellIndex, state: CellState) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Some(Cell::with_state(id, index, state)));
        self.region.add(index, id);
        self.spatial_idx.insert(CellEntry { point: index.point(), id });
        id
    }

    /// Remove a cell immediately, dropping every neighborhood link to it.
    ///
    /// Prefer [`defer`](Self::defer) with [`StructuralChange::RemoveCell`]
    /// while iterating the space.
    pub fn remove_cell(&mut self, id: CellId) -> SpatialResult<Cell> {
        let cell = self
            .cells
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(SpatialError::CellNotFound(id))?;

        self.region.erase(cell.index(), id);
        self.spatial_idx.remove(&CellEntry { point: cell.index().point(), id });
        for other in self.cells.iter_mut().flatten() {
            for hood in other.neighborhoods_mut() {
                hood.erase_cell(id);
            }
        }
        Ok(cell)
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Like [`cell`](Self::cell) but with a typed error.
    pub fn try_cell(&self, id: CellId) -> SpatialResult<&Cell> {
        self.cell(id).ok_or(SpatialError::CellNotFound(id))
    }

    pub fn try_cell_mut(&mut self, id: CellId) -> SpatialResult<&mut Cell> {
        self.cell_mut(id).ok_or(SpatialError::CellNotFound(id))
    }

    /// The first cell at `index`.  Several cells may share an index; see
    /// [`Region::find_all`] through [`region`](Self::region) for all of them.
    pub fn find(&self, index: CellIndex) -> Option<CellId> {
        self.region.find(index)
    }

    pub fn cell_at(&self, index: CellIndex) -> Option<&Cell> {
        self.find(index).and_then(|id| self.cell(id))
    }

    /// The region over every live cell.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Live cell handles in iteration order.
    pub fn cell_ids(&self) -> Vec<CellId> {
        self.region.cells().collect()
    }

    /// Live cells in arena order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().flatten()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut().flatten()
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// The live cell whose position is nearest to `(x, y)`.
    pub fn nearest(&self, x: f64, y: f64) -> Option<CellId> {
        self.spatial_idx.nearest_neighbor(&[x, y]).map(|e| e.id)
    }

    // ── Space attributes ──────────────────────────────────────────────────

    pub fn attributes(&self) -> &CellState {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut CellState {
        &mut self.attributes
    }

    // ── Agent broadcast ───────────────────────────────────────────────────

    /// Track `mode` for `agent` in every cell currently in the space.
    /// Returns the number of cells touched.
    pub fn attach_agent(&mut self, agent: AgentId, mode: ModeId) -> usize {
        let mut n = 0;
        for cell in self.cells_mut() {
            cell.attach_control_mode(agent, mode);
            n += 1;
        }
        n
    }

    /// Stop tracking `agent` in every cell.  Returns the number of cells
    /// that were tracking it.
    pub fn detach_agent(&mut self, agent: AgentId) -> usize {
        self.cells_mut()
            .map(|cell| cell.detach_control_mode(agent))
            .filter(|&removed| removed)
            .count()
    }

    // ── Synchronize ───────────────────────────────────────────────────────

    /// Commit every cell's current attributes into its past snapshot.
    pub fn synchronize(&mut self, scope: SyncScope<'_>) {
        #[cfg(not(feature = "parallel"))]
        {
            for cell in self.cells_mut() {
                cell.synchronize(scope);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.cells
                .par_iter_mut()
                .filter_map(Option::as_mut)
                .for_each(|cell| cell.synchronize(scope));
        }
    }

    // ── Neighborhood strategies ───────────────────────────────────────────

    /// Link every cell to the (up to) eight cells around it.
    ///
    /// With `wrap`, positions past the edge of the space's bounding box wrap
    /// around to the opposite edge (torus).  Weights are `1 / neighbor_count`
    /// per cell.  Returns the number of links created.
    pub fn create_moore_neighborhood(&mut self, name: &str, self_included: bool, wrap: bool) -> usize {
        let mut offsets = Vec::with_capacity(9);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx, dy) != (0, 0) || self_included {
                    offsets.push((dx, dy));
                }
            }
        }
        self.create_neighborhood(name, &offsets, wrap)
    }

    /// Link every cell to the (up to) four orthogonally adjacent cells.
    pub fn create_von_neumann_neighborhood(&mut self, name: &str, self_included: bool, wrap: bool) -> usize {
        let mut offsets = vec![(-1, 0), (1, 0), (0, -1), (0, 1)];
        if self_included {
            offsets.push((0, 0));
        }
        self.create_neighborhood(name, &offsets, wrap)
    }

    fn create_neighborhood(&mut self, name: &str, offsets: &[(i32, i32)], wrap: bool) -> usize {
        let Some(bounds) = self.bounds() else {
            return 0;
        };

        let cells: Vec<(CellIndex, CellId)> = self.region.iter().collect();
        let mut links = 0;
        for (index, id) in cells {
            let mut hood = Neighborhood::new(id);
            for &(dx, dy) in offsets {
                let target = if wrap {
                    Some(bounds.wrap(index, dx, dy))
                } else {
                    index.checked_offset(dx, dy)
                };
                let Some(target) = target else {
                    continue;
                };
                if let Some(neighbor) = self.region.find(target) {
                    hood.add(target, neighbor);
                }
            }
            let n = hood.len();
            if n == 0 {
                continue;
            }
            let weight = 1.0 / n as f64;
            let targets: Vec<CellIndex> = hood.iter().map(|(idx, _)| idx).collect();
            for target in targets {
                hood.set_weight(target, weight);
            }
            links += n;
            if let Some(cell) = self.cell_mut(id) {
                cell.add_neighborhood(name, hood);
            }
        }
        tracing::debug!(space = %self.name, neighborhood = name, links, "neighborhood created");
        links
    }

    fn bounds(&self) -> Option<Bounds> {
        let mut it = self.region.iter().map(|(idx, _)| idx);
        let first = it.next()?;
        let mut b = Bounds { min: first, max: first };
        for idx in it {
            b.min.x = b.min.x.min(idx.x);
            b.min.y = b.min.y.min(idx.y);
            b.max.x = b.max.x.max(idx.x);
            b.max.y = b.max.y.max(idx.y);
        }
        Some(b)
    }

    // ── Deferred structural changes ───────────────────────────────────────

    /// Queue a structural change for the next [`update`](Self::update).
    pub fn defer(&mut self, change: StructuralChange) {
        self.pending.push_back(change);
    }

    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }

    /// Apply queued structural changes in the order they were deferred.
    ///
    /// Returns the number applied.  On failure the offending change is
    /// dropped, the error returned, and the changes queued after it stay
    /// queued for the next call.
    pub fn update(&mut self) -> SpatialResult<usize> {
        let mut applied = 0;
        while let Some(change) = self.pending.pop_front() {
            self.apply(change)?;
            applied += 1;
        }
        if applied > 0 {
            tracing::debug!(space = %self.name, applied, "structural changes applied");
        }
        Ok(applied)
    }

    fn apply(&mut self, change: StructuralChange) -> SpatialResult<()> {
        match change {
            StructuralChange::AddCell { index, state } => {
                self.add_cell_with(index, state);
            }
            StructuralChange::RemoveCell(id) => {
                self.remove_cell(id)?;
            }
            StructuralChange::Link { from, neighborhood, to, weight } => {
                let to_index = self.try_cell(to)?.index();
                self.try_cell_mut(from)?
                    .neighborhood_entry(&neighborhood)
                    .add_weighted(to_index, to, weight);
            }
            StructuralChange::Unlink { from, neighborhood, to } => {
                let cell = self.try_cell_mut(from)?;
                let hood = cell.neighborhood_mut(&neighborhood).ok_or_else(|| {
                    SpatialError::NeighborhoodNotFound { cell: from, name: neighborhood.clone() }
                })?;
                if !hood.erase(to) {
                    return Err(SpatialError::IndexNotFound(to));
                }
            }
        }
        Ok(())
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Inclusive bounding box of a space's indices.
struct Bounds {
    min: CellIndex,
    max: CellIndex,
}

impl Bounds {
    /// `idx` displaced by `(dx, dy)` and folded back into the box.
    fn wrap(&self, idx: CellIndex, dx: i32, dy: i32) -> CellIndex {
        CellIndex::new(
            wrap_axis(idx.x, dx, self.min.x, self.max.x),
            wrap_axis(idx.y, dy, self.min.y, self.max.y),
        )
    }
}

/// Computed in `i64` so that boxes spanning the whole `i32` range neither
/// overflow nor alias.
fn wrap_axis(v: i32, d: i32, min: i32, max: i32) -> i32 {
    let span = i64::from(max) - i64::from(min) + 1;
    let folded = (i64::from(v) + i64::from(d) - i64::from(min)).rem_euclid(span) + i64::from(min);
    // `folded` lies in `min..=max`.
    folded as i32
}
