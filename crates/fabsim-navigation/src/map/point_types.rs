use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a cell position in grid coordinates (column and row indices).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPoint {
    /// Column index, along the floor's x axis.
    pub col: usize,
    /// Row index, along the floor's z axis.
    pub row: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Chebyshev distance in grid steps, the step count of the shortest move
    /// sequence when diagonal moves cost the same as orthogonal ones.
    pub fn chebyshev_distance(&self, other: &GridPoint) -> usize {
        self.col.abs_diff(other.col).max(self.row.abs_diff(other.row))
    }

    /// Euclidean distance in grid-index units.
    pub fn euclidean_distance(&self, other: &GridPoint) -> f32 {
        let dc = self.col.abs_diff(other.col) as f32;
        let dr = self.row.abs_diff(other.row) as f32;
        (dc * dc + dr * dr).sqrt()
    }
}

impl From<(usize, usize)> for GridPoint {
    fn from((col, row): (usize, usize)) -> Self {
        Self::new(col, row)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.col, self.row)
    }
}

/// Represents a point on the floor plane in world coordinates.
///
/// The origin sits at the center of the floor; `x` runs along the floor width
/// and `z` along its depth, matching the obstacle placement convention.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldPoint {
    /// The x-coordinate in floor units.
    pub x: f32,
    /// The z-coordinate in floor units.
    pub z: f32,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Straight-line distance to another point.
    pub fn distance(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl From<(f32, f32)> for WorldPoint {
    fn from((x, z): (f32, f32)) -> Self {
        Self::new(x, z)
    }
}

impl From<[f32; 2]> for WorldPoint {
    fn from([x, z]: [f32; 2]) -> Self {
        Self::new(x, z)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.z)
    }
}
