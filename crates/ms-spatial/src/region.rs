//! `Region`: an ordered multimap from cell position to cell handle.
//!
//! Two distinct cells may share one index; nothing here assumes uniqueness.
//! Iteration order is index order, then insertion order among entries with
//! the same index.

use std::collections::BTreeMap;

use ms_core::CellId;

use crate::CellIndex;

/// A set of cells addressed by position.
///
/// Stores `CellId` handles into a [`CellularSpace`](crate::CellularSpace)
/// arena; a region never owns cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    inner: BTreeMap<CellIndex, Vec<CellId>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(index, cell)` without checking for an existing entry.
    pub fn add(&mut self, index: CellIndex, cell: CellId) {
        self.inner.entry(index).or_default().push(cell);
        self.total += 1;
    }

    /// The first cell stored under `index`, or `None`.
    pub fn find(&self, index: CellIndex) -> Option<CellId> {
        self.inner.get(&index).and_then(|cells| cells.first().copied())
    }

    /// Every cell stored under `index`, in insertion order.
    pub fn find_all(&self, index: CellIndex) -> &[CellId] {
        self.inner.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_index(&self, index: CellIndex) -> bool {
        self.inner.contains_key(&index)
    }

    /// Remove exactly one `(index, cell)` entry.  Other entries under the
    /// same index are left intact.
    pub fn erase(&mut self, index: CellIndex, cell: CellId) -> bool {
        let Some(cells) = self.inner.get_mut(&index) else {
            return false;
        };
        let Some(pos) = cells.iter().position(|&c| c == cell) else {
            return false;
        };
        cells.remove(pos);
        if cells.is_empty() {
            self.inner.remove(&index);
        }
        self.total -= 1;
        true
    }

    /// Remove every entry under `index`.  Returns how many were removed.
    pub fn erase_index(&mut self, index: CellIndex) -> usize {
        let removed = self.inner.remove(&index).map_or(0, |cells| cells.len());
        self.total -= removed;
        removed
    }

    /// Remove one entry for `cell` wherever it is stored.
    pub fn remove_cell(&mut self, cell: CellId) -> bool {
        let Some(index) = self
            .iter()
            .find_map(|(idx, c)| (c == cell).then_some(idx))
        else {
            return false;
        };
        self.erase(index, cell)
    }

    /// All `(index, cell)` entries in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, CellId)> + '_ {
        self.inner
            .iter()
            .flat_map(|(&idx, cells)| cells.iter().map(move |&c| (idx, c)))
    }

    /// Cell handles in iteration order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.iter().map(|(_, c)| c)
    }

    /// Total number of entries (not distinct indices).
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct indices with at least one entry.
    pub fn index_count(&self) -> usize {
        self.inner.len()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }
}

impl FromIterator<(CellIndex, CellId)> for Region {
    fn from_iter<I: IntoIterator<Item = (CellIndex, CellId)>>(iter: I) -> Self {
        let mut region = Region::new();
        for (idx, cell) in iter {
            region.add(idx, cell);
        }
        region
    }
}
