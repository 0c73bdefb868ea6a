//! Weighted directed neighborhood graphs.

use std::collections::BTreeMap;

use ms_core::CellId;

use crate::CellIndex;

/// One outgoing link of a [`Neighborhood`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub cell:   CellId,
    pub weight: f64,
}

/// Outgoing weighted links from one cell, keyed by the neighbor's position.
///
/// `parent` is the cell that owns the neighborhood.  It is a plain handle
/// used for lookups, never for lifetime management.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighborhood {
    parent:  CellId,
    entries: BTreeMap<CellIndex, Neighbor>,
}

impl Neighborhood {
    pub fn new(parent: CellId) -> Self {
        Self { parent, entries: BTreeMap::new() }
    }

    /// Link to `cell` at `index` with weight 0.
    pub fn add(&mut self, index: CellIndex, cell: CellId) -> Option<Neighbor> {
        self.add_weighted(index, cell, 0.0)
    }

    /// Link to `cell` at `index`, replacing (and returning) any existing link
    /// at that index.
    pub fn add_weighted(&mut self, index: CellIndex, cell: CellId, weight: f64) -> Option<Neighbor> {
        self.entries.insert(index, Neighbor { cell, weight })
    }

    pub fn erase(&mut self, index: CellIndex) -> bool {
        self.entries.remove(&index).is_some()
    }

    /// Drop every link pointing at `cell`.  Returns how many were removed.
    pub fn erase_cell(&mut self, cell: CellId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, n| n.cell != cell);
        before - self.entries.len()
    }

    pub fn get(&self, index: CellIndex) -> Option<&Neighbor> {
        self.entries.get(&index)
    }

    pub fn weight(&self, index: CellIndex) -> Option<f64> {
        self.entries.get(&index).map(|n| n.weight)
    }

    /// Returns `false` if there is no link at `index`.
    pub fn set_weight(&mut self, index: CellIndex, weight: f64) -> bool {
        match self.entries.get_mut(&index) {
            Some(n) => {
                n.weight = weight;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        self.entries.contains_key(&index)
    }

    #[inline]
    pub fn parent(&self) -> CellId {
        self.parent
    }

    pub fn set_parent(&mut self, parent: CellId) {
        self.parent = parent;
    }

    /// Links in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, &Neighbor)> + '_ {
        self.entries.iter().map(|(&idx, n)| (idx, n))
    }

    /// Neighbor handles in index order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.entries.values().map(|n| n.cell)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
