//! Integer cell positions.

use std::fmt;

/// The `(x, y)` position of a cell in its space.
///
/// Ordered by `x` then `y`, which fixes the iteration order of every
/// [`Region`](crate::Region) and [`Neighborhood`](crate::Neighborhood).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellIndex {
    pub x: i32,
    pub y: i32,
}

impl CellIndex {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The index displaced by `(dx, dy)`, or `None` if either coordinate
    /// would leave the `i32` range.
    #[inline]
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Planar coordinates used by the nearest-cell index.
    #[inline]
    pub(crate) fn point(self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl From<(i32, i32)> for CellIndex {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
