#![warn(missing_docs)]

// NOTES:
// - Obstacles block only the cell under their center point. A footprint wider
//   than one pitch is NOT rasterized over its full extent; routes computed on
//   this grid depend on that, so changing it changes which paths are valid.

use tracing::{debug, trace};

use super::{GridPoint, WorldPoint};
use crate::error::NavigationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangular obstacle footprint on the floor plane.
///
/// `x` and `z` locate the footprint center in floor-centered coordinates;
/// `width` extends along x and `depth` along z.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    /// Center x-coordinate.
    pub x: f32,
    /// Center z-coordinate.
    pub z: f32,
    /// Extent along x.
    pub width: f32,
    /// Extent along z.
    pub depth: f32,
}

impl Obstacle {
    /// Creates a new `Obstacle`.
    #[must_use]
    pub const fn new(x: f32, z: f32, width: f32, depth: f32) -> Self {
        Self { x, z, width, depth }
    }

    /// Center of the footprint.
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.z)
    }
}

/// One discretized unit of floor space.
///
/// Search bookkeeping (`g`, `h`, `f`, parent links) is not stored here; the
/// planner keeps it in a per-call arena so a grid can be reused and shared
/// between planning calls without a reset pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    /// Column index.
    pub col: usize,
    /// Row index.
    pub row: usize,
    /// Whether the cell can be traversed. Fixed once the grid is built.
    pub walkable: bool,
}

impl GridCell {
    /// Grid position of this cell.
    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.col, self.row)
    }
}

/// A uniform walkability grid covering a rectangular floor.
///
/// The floor is centered on the world origin, so it spans
/// `[-width/2, width/2) x [-height/2, height/2)`. Cells are square with side
/// `pitch` and are stored row-major.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FloorGrid {
    /// Floor extent along x, in floor units
    width: f32,
    /// Floor extent along z, in floor units
    height: f32,
    /// Side length of one cell
    pitch: f32,
    /// Number of columns, `ceil(width / pitch)`
    cols: usize,
    /// Number of rows, `ceil(height / pitch)`
    rows: usize,
    cells: Vec<GridCell>,
}

impl FloorGrid {
    /// Builds a walkability grid for a floor and its static obstacles.
    ///
    /// # Arguments
    /// * `width` - Floor extent along x
    /// * `height` - Floor extent along z
    /// * `pitch` - Side length of one grid cell
    /// * `obstacles` - Obstacle footprints in floor-centered coordinates
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid, or a configuration error if
    ///   the pitch, the dimensions or an obstacle is invalid
    pub fn build(
        width: f32,
        height: f32,
        pitch: f32,
        obstacles: &[Obstacle],
    ) -> Result<Self, NavigationError> {
        // `!(a > 0.0)` also rejects NaN
        if !(pitch > 0.0) || !pitch.is_finite() {
            return Err(NavigationError::InvalidPitch("Pitch must be positive"));
        }
        if !(width > 0.0) || !(height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(NavigationError::InvalidDimensions(
                "Floor width and height must be positive",
            ));
        }

        let cols_f = (width / pitch).ceil();
        let rows_f = (height / pitch).ceil();
        if cols_f > u32::MAX as f32 || rows_f > u32::MAX as f32 {
            return Err(NavigationError::InvalidDimensions(
                "Floor too large for the given pitch",
            ));
        }
        let cols = cols_f as usize;
        let rows = rows_f as usize;
        let Some(cell_count) = cols.checked_mul(rows) else {
            return Err(NavigationError::InvalidDimensions(
                "Grid dimensions too large, would cause overflow",
            ));
        };

        let mut cells = Vec::new();
        if cells.try_reserve_exact(cell_count).is_err() {
            return Err(NavigationError::InvalidDimensions(
                "Grid dimensions too large, would cause overflow",
            ));
        }
        for row in 0..rows {
            for col in 0..cols {
                cells.push(GridCell { col, row, walkable: true });
            }
        }

        let mut grid = FloorGrid { width, height, pitch, cols, rows, cells };

        for obstacle in obstacles {
            if !(obstacle.width > 0.0) || !(obstacle.depth > 0.0) {
                return Err(NavigationError::InvalidObstacle(
                    "Obstacle footprint must be positive",
                ));
            }
            let p = grid.world_to_cell(obstacle.center()).map_err(|_| {
                NavigationError::InvalidObstacle("Obstacle center lies outside the floor")
            })?;
            trace!(obstacle = ?obstacle, cell = %p, "Blocking obstacle cell");
            let index = grid.get_index(p);
            grid.cells[index].walkable = false;
        }

        debug!(
            cols = grid.cols,
            rows = grid.rows,
            pitch = grid.pitch,
            blocked = grid.blocked_count(),
            "Built floor grid"
        );
        Ok(grid)
    }

    /// Calculates the index in the cell vector for a given grid point
    fn get_index(&self, p: GridPoint) -> usize {
        p.row * self.cols + p.col
    }

    /// Flat cell index of an in-bounds grid point.
    pub(crate) fn index_of(&self, p: GridPoint) -> usize {
        self.get_index(p)
    }

    /// Grid point of a flat cell index.
    pub(crate) fn point_of(&self, index: usize) -> GridPoint {
        GridPoint::new(index % self.cols, index / self.cols)
    }

    /// Returns true if the grid point lies inside the grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.col < self.cols && p.row < self.rows
    }

    /// Gets the cell at a column and row.
    ///
    /// # Returns
    /// * `Result<&GridCell, NavigationError>` - The cell, or `OutOfBounds`
    pub fn cell_at(&self, col: usize, row: usize) -> Result<&GridCell, NavigationError> {
        let p = GridPoint::new(col, row);
        if self.contains(p) {
            Ok(&self.cells[self.get_index(p)])
        } else {
            Err(NavigationError::OutOfBounds("Grid index out of bounds"))
        }
    }

    /// Returns whether the cell at a column and row is walkable.
    pub fn is_walkable(&self, col: usize, row: usize) -> Result<bool, NavigationError> {
        self.cell_at(col, row).map(|cell| cell.walkable)
    }

    /// Converts a floor-centered world point to the grid cell containing it.
    ///
    /// Uses `floor((x + width/2) / pitch)` for the column and the same rule on
    /// `z` for the row. A point exactly on the far edge of the floor is outside.
    ///
    /// # Returns
    /// * `Result<GridPoint, NavigationError>` - The cell, or
    ///   `InvalidWorldCoordinates` if the point does not map into the grid
    pub fn world_to_cell(&self, world_p: WorldPoint) -> Result<GridPoint, NavigationError> {
        let col_f = ((world_p.x + self.width / 2.0) / self.pitch).floor();
        let row_f = ((world_p.z + self.height / 2.0) / self.pitch).floor();

        // NaN fails every comparison, so it is rejected here as well
        let in_range = |v: f32, limit: usize| v >= 0.0 && v < limit as f32;
        if !in_range(col_f, self.cols) || !in_range(row_f, self.rows) {
            return Err(NavigationError::InvalidWorldCoordinates(
                "World coordinates outside floor bounds",
            ));
        }

        Ok(GridPoint::new(col_f as usize, row_f as usize))
    }

    /// Converts a grid cell to the world coordinates of its center.
    ///
    /// # Returns
    /// * `Result<WorldPoint, NavigationError>` - The cell center, or `OutOfBounds`
    pub fn cell_center(&self, p: GridPoint) -> Result<WorldPoint, NavigationError> {
        if !self.contains(p) {
            return Err(NavigationError::OutOfBounds("Grid index out of bounds"));
        }
        let x = (p.col as f32 + 0.5) * self.pitch - self.width / 2.0;
        let z = (p.row as f32 + 0.5) * self.pitch - self.height / 2.0;
        Ok(WorldPoint::new(x, z))
    }

    /// Number of columns in the grid.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Side length of one cell.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Floor extent along x.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Floor extent along z.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Number of unwalkable cells.
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.walkable).count()
    }
}

impl std::fmt::Display for FloorGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "FloorGrid ({}x{} cells, pitch: {:.3}, floor: {:.2}x{:.2})",
            self.cols, self.rows, self.pitch, self.width, self.height
        )?;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = &self.cells[self.get_index(GridPoint::new(col, row))];
                write!(f, "{}", if cell.walkable { '.' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_layout() -> Vec<Obstacle> {
        [(-5.0, -5.0), (0.0, -5.0), (5.0, -5.0), (-5.0, 0.0), (0.0, 0.0), (5.0, 0.0)]
            .into_iter()
            .map(|(x, z)| Obstacle::new(x, z, 2.0, 2.0))
            .collect()
    }

    #[test]
    fn test_grid_creation() {
        let grid = FloorGrid::build(40.0, 40.0, 2.0, &[]).unwrap();
        assert_eq!(grid.cols(), 20);
        assert_eq!(grid.rows(), 20);
        assert_eq!(grid.pitch(), 2.0);
        assert_eq!(grid.cells().len(), 400);
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = FloorGrid::build(5.0, 3.0, 2.0, &[]).unwrap();
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            FloorGrid::build(10.0, 10.0, 0.0, &[]),
            Err(NavigationError::InvalidPitch(_))
        ));
        assert!(matches!(
            FloorGrid::build(10.0, 10.0, -1.0, &[]),
            Err(NavigationError::InvalidPitch(_))
        ));
        assert!(matches!(
            FloorGrid::build(10.0, 10.0, f32::NAN, &[]),
            Err(NavigationError::InvalidPitch(_))
        ));
        assert!(matches!(
            FloorGrid::build(0.0, 10.0, 1.0, &[]),
            Err(NavigationError::InvalidDimensions(_))
        ));
        assert!(matches!(
            FloorGrid::build(10.0, -2.0, 1.0, &[]),
            Err(NavigationError::InvalidDimensions(_))
        ));
        assert!(FloorGrid::build(10.0, 0.0, 1.0, &[]).unwrap_err().is_config_error());
    }

    #[test]
    fn test_oversized_floor_is_rejected() {
        // 1e18 cells: the count fits in usize but the cell vector cannot be allocated
        assert!(matches!(
            FloorGrid::build(1.0e9, 1.0e9, 1.0, &[]),
            Err(NavigationError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_invalid_obstacles() {
        let outside = [Obstacle::new(50.0, 0.0, 1.0, 1.0)];
        assert!(matches!(
            FloorGrid::build(10.0, 10.0, 1.0, &outside),
            Err(NavigationError::InvalidObstacle(_))
        ));
        let flat = [Obstacle::new(0.0, 0.0, 0.0, 1.0)];
        assert!(matches!(
            FloorGrid::build(10.0, 10.0, 1.0, &flat),
            Err(NavigationError::InvalidObstacle(_))
        ));
    }

    #[test]
    fn test_obstacles_block_single_center_cell() {
        let grid = FloorGrid::build(20.0, 20.0, 1.0, &reference_layout()).unwrap();
        // 2x2 footprints still block exactly one cell each
        assert_eq!(grid.blocked_count(), 6);

        // (0, 0) -> col/row floor((0 + 10) / 1) = 10
        assert!(!grid.is_walkable(10, 10).unwrap());
        // (-5, -5) -> 5
        assert!(!grid.is_walkable(5, 5).unwrap());
        // (5, 0) -> col 15, row 10
        assert!(!grid.is_walkable(15, 10).unwrap());
        // neighbours inside the 2x2 footprint stay walkable
        assert!(grid.is_walkable(9, 10).unwrap());
        assert!(grid.is_walkable(10, 9).unwrap());
        assert!(grid.is_walkable(11, 11).unwrap());
    }

    #[test]
    fn test_cell_at() {
        let grid = FloorGrid::build(4.0, 4.0, 1.0, &[]).unwrap();
        let cell = grid.cell_at(3, 2).unwrap();
        assert_eq!(cell.point(), GridPoint::new(3, 2));
        assert!(cell.walkable);

        assert!(matches!(grid.cell_at(4, 0), Err(NavigationError::OutOfBounds(_))));
        assert!(matches!(grid.cell_at(0, 4), Err(NavigationError::OutOfBounds(_))));
        assert!(grid.is_walkable(9, 9).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_coordinate_conversion() {
        let grid = FloorGrid::build(40.0, 40.0, 2.0, &[]).unwrap();

        // Floor center sits on the corner shared by cells 9 and 10
        assert_eq!(grid.world_to_cell(WorldPoint::new(0.0, 0.0)).unwrap(), GridPoint::new(10, 10));
        assert_eq!(grid.world_to_cell(WorldPoint::new(-20.0, -20.0)).unwrap(), GridPoint::new(0, 0));
        assert_eq!(grid.world_to_cell(WorldPoint::new(19.0, 19.0)).unwrap(), GridPoint::new(19, 19));
        assert_eq!(grid.world_to_cell(WorldPoint::new(-0.5, 3.9)).unwrap(), GridPoint::new(9, 11));

        // Far edge is outside
        assert!(matches!(
            grid.world_to_cell(WorldPoint::new(20.0, 0.0)),
            Err(NavigationError::InvalidWorldCoordinates(_))
        ));
        assert!(grid.world_to_cell(WorldPoint::new(0.0, -20.01)).is_err());
        assert!(grid.world_to_cell(WorldPoint::new(f32::NAN, 0.0)).is_err());

        let center = grid.cell_center(GridPoint::new(10, 10)).unwrap();
        assert!((center.x - 1.0).abs() < 1e-6);
        assert!((center.z - 1.0).abs() < 1e-6);
        let corner = grid.cell_center(GridPoint::new(0, 19)).unwrap();
        assert!((corner.x - (-19.0)).abs() < 1e-6);
        assert!((corner.z - 19.0).abs() < 1e-6);
        assert!(matches!(
            grid.cell_center(GridPoint::new(20, 0)),
            Err(NavigationError::OutOfBounds(_))
        ));

        // A cell center maps back to the same cell
        for p in [GridPoint::new(0, 0), GridPoint::new(7, 13), GridPoint::new(19, 19)] {
            let c = grid.cell_center(p).unwrap();
            assert_eq!(grid.world_to_cell(c).unwrap(), p);
        }
    }

    #[test]
    fn test_index_round_trip() {
        let grid = FloorGrid::build(6.0, 4.0, 1.0, &[]).unwrap();
        let p = GridPoint::new(5, 3);
        assert_eq!(grid.point_of(grid.index_of(p)), p);
        assert_eq!(grid.index_of(GridPoint::new(1, 1)), 7);
    }

    #[test]
    fn test_display() {
        let grid = FloorGrid::build(3.0, 3.0, 1.0, &[Obstacle::new(0.0, 0.0, 1.0, 1.0)]).unwrap();
        let display_str = format!("{}", grid);
        assert!(display_str.contains("FloorGrid (3x3"));
        assert!(display_str.contains(".#."));
    }
}
