/*

A* over the floor grid:  f(n) = g(n) + h(n)

    g(n) = moves taken from the start cell (every move costs 1, diagonals included)
    h(n) = Euclidean distance from n to the goal cell, in grid-index units
    f(n) = estimated cost of the cheapest route through n

Search bookkeeping lives in a node arena that is allocated for each call and
indexed by flat cell index, so the grid itself is never written to and a
parent link is just an index into the arena.

Open set ties on f are broken by lower h, then lower column, then lower row.

*/

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use tracing::{debug, trace};

use crate::error::NavigationError;
use crate::map::{FloorGrid, GridPoint, WorldPoint};
use crate::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chebyshev neighbourhood, diagonals included.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Represents the result of an A* search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult {
    /// The route as cell-center waypoints. Empty when no route exists.
    pub path: Path,
    /// The grid cells of the route, start to goal.
    pub cells: Vec<GridPoint>,
    /// The `g` value recorded at the goal cell when it was selected.
    pub total_cost: Option<usize>,
    /// The number of cells expanded during the search.
    pub nodes_explored: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Path, cells: Vec<GridPoint>, total_cost: usize, nodes_explored: usize) -> Self {
        Self {
            path,
            cells,
            total_cost: Some(total_cost),
            nodes_explored,
        }
    }

    /// Creates a new PathResult for a search that exhausted the open set.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: Path::empty(),
            cells: Vec::new(),
            total_cost: None,
            nodes_explored,
        }
    }

    /// Returns true if a route was found.
    pub fn is_success(&self) -> bool {
        !self.path.is_empty()
    }

    /// Returns the route, empty if none was found.
    pub fn into_path(self) -> Path {
        self.path
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_cost {
            Some(cost) => write!(
                f,
                "PathResult {{ success: true, waypoints: {}, total_cost: {}, nodes_explored: {} }}",
                self.path.len(),
                cost,
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    Open,
    Closed,
}

/// Per-call search scratch for one cell.
#[derive(Copy, Clone, Debug)]
struct SearchNode {
    g: usize,
    h: f32,
    f: f32,
    parent: Option<usize>,
    state: NodeState,
}

impl SearchNode {
    const UNVISITED: SearchNode = SearchNode {
        g: 0,
        h: 0.0,
        f: 0.0,
        parent: None,
        state: NodeState::Unvisited,
    };

    fn open(&mut self, g: usize, h: f32, parent: Option<usize>) {
        self.g = g;
        self.h = h;
        self.f = g as f32 + h;
        self.parent = parent;
        self.state = NodeState::Open;
    }
}

/// Open set entry. Superseded entries stay in the heap and are skipped when
/// popped because their cell is already closed.
#[derive(Copy, Clone, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
    point: GridPoint,
    index: usize,
}

// The priority queue depends on `Ord`; invert every comparison so the
// max-heap pops the lowest f first.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.point.col.cmp(&self.point.col))
            .then_with(|| other.point.row.cmp(&self.point.row))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// A* planner over a borrowed [`FloorGrid`].
///
/// The planner holds no search state between calls; each call allocates its
/// own scratch, so repeated calls with the same input return the same route.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner<'a> {
    grid: &'a FloorGrid,
}

impl<'a> PathPlanner<'a> {
    /// Creates a planner for a grid.
    pub fn new(grid: &'a FloorGrid) -> Self {
        Self { grid }
    }

    /// Finds a route between two world points.
    ///
    /// # Returns
    /// * `Result<Path, NavigationError>` - The route (empty when none exists),
    ///   or `InvalidWorldCoordinates` if either point lies outside the floor
    ///
    /// Off-floor world points are reported as `InvalidWorldCoordinates`, never
    /// as `OutOfBounds`, which is reserved for cell indices. Use
    /// [`NavigationError::is_out_of_bounds`] to match both.
    pub fn find_path(&self, start: WorldPoint, end: WorldPoint) -> Result<Path, NavigationError> {
        self.find_path_detailed(start, end).map(PathResult::into_path)
    }

    /// Finds a route between two world points, returning search metadata.
    pub fn find_path_detailed(
        &self,
        start: WorldPoint,
        end: WorldPoint,
    ) -> Result<PathResult, NavigationError> {
        trace!(%start, %end, "find_path");
        let start_cell = self.grid.world_to_cell(start).map_err(|_| {
            debug!(%start, "Start point outside floor");
            NavigationError::InvalidWorldCoordinates("Start point outside floor bounds")
        })?;
        let goal_cell = self.grid.world_to_cell(end).map_err(|_| {
            debug!(%end, "End point outside floor");
            NavigationError::InvalidWorldCoordinates("End point outside floor bounds")
        })?;
        self.search(start_cell, goal_cell)
    }

    /// Finds a route between two grid cells, returning search metadata.
    ///
    /// # Returns
    /// * `Result<PathResult, NavigationError>` - The search result, or
    ///   `OutOfBounds` if either cell lies outside the grid
    pub fn find_path_cells(
        &self,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<PathResult, NavigationError> {
        if !self.grid.contains(start) || !self.grid.contains(goal) {
            return Err(NavigationError::OutOfBounds("Start or goal cell outside grid"));
        }
        self.search(start, goal)
    }

    fn search(&self, start: GridPoint, goal: GridPoint) -> Result<PathResult, NavigationError> {
        let grid = self.grid;
        let mut nodes = vec![SearchNode::UNVISITED; grid.cells().len()];
        let mut open_set = BinaryHeap::new();
        let mut nodes_explored = 0;

        let start_index = grid.index_of(start);
        let goal_index = grid.index_of(goal);

        let h_start = start.euclidean_distance(&goal);
        nodes[start_index].open(0, h_start, None);
        open_set.push(OpenEntry {
            f: h_start,
            h: h_start,
            point: start,
            index: start_index,
        });

        while let Some(entry) = open_set.pop() {
            if nodes[entry.index].state == NodeState::Closed {
                continue;
            }
            nodes_explored += 1;

            if entry.index == goal_index {
                let total_cost = nodes[goal_index].g;
                let cells = reconstruct_cells(grid, &nodes, goal_index);
                let waypoints = cells
                    .iter()
                    .map(|p| grid.cell_center(*p))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(
                    %start,
                    %goal,
                    total_cost,
                    nodes_explored,
                    "Route found"
                );
                return Ok(PathResult::success(Path::new(waypoints), cells, total_cost, nodes_explored));
            }

            nodes[entry.index].state = NodeState::Closed;
            let current_g = nodes[entry.index].g;

            for neighbor in neighbors(grid, entry.point) {
                let index = grid.index_of(neighbor);
                if !grid.cells()[index].walkable || nodes[index].state == NodeState::Closed {
                    continue;
                }

                let tentative_g = current_g + 1;
                let node = &mut nodes[index];
                if node.state == NodeState::Unvisited || tentative_g < node.g {
                    let h = neighbor.euclidean_distance(&goal);
                    node.open(tentative_g, h, Some(entry.index));
                    open_set.push(OpenEntry {
                        f: node.f,
                        h,
                        point: neighbor,
                        index,
                    });
                }
            }
        }

        debug!(%start, %goal, nodes_explored, "No route between cells");
        Ok(PathResult::failure(nodes_explored))
    }
}

/// Finds a route between two world points on a grid.
///
/// Convenience wrapper around [`PathPlanner::find_path`]; an off-floor point
/// yields `InvalidWorldCoordinates` (see [`NavigationError::is_out_of_bounds`]).
pub fn find_path(grid: &FloorGrid, start: WorldPoint, end: WorldPoint) -> Result<Path, NavigationError> {
    PathPlanner::new(grid).find_path(start, end)
}

/// In-bounds Chebyshev neighbours of a cell.
fn neighbors(grid: &FloorGrid, p: GridPoint) -> impl Iterator<Item = GridPoint> + '_ {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dc, dr)| {
        let col = p.col.checked_add_signed(dc)?;
        let row = p.row.checked_add_signed(dr)?;
        let neighbor = GridPoint::new(col, row);
        grid.contains(neighbor).then_some(neighbor)
    })
}

/// Follows parent links from the goal back to the start.
fn reconstruct_cells(grid: &FloorGrid, nodes: &[SearchNode], goal_index: usize) -> Vec<GridPoint> {
    let mut cells = vec![grid.point_of(goal_index)];
    let mut current = goal_index;
    while let Some(previous) = nodes[current].parent {
        cells.push(grid.point_of(previous));
        current = previous;
    }
    cells.reverse();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Obstacle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_connected(cells: &[GridPoint]) {
        for pair in cells.windows(2) {
            assert_eq!(
                pair[0].chebyshev_distance(&pair[1]),
                1,
                "Consecutive cells {} and {} are not adjacent",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_open_set_pops_lowest_f() {
        let mut heap = BinaryHeap::new();
        let entry = |f: f32, h: f32, col: usize, row: usize| OpenEntry {
            f,
            h,
            point: GridPoint::new(col, row),
            index: 0,
        };
        heap.push(entry(5.0, 1.0, 0, 0));
        heap.push(entry(3.0, 2.0, 4, 4));
        heap.push(entry(3.0, 1.0, 9, 9));
        heap.push(entry(3.0, 1.0, 2, 7));
        heap.push(entry(3.0, 1.0, 2, 3));

        let order: Vec<GridPoint> = std::iter::from_fn(|| heap.pop()).map(|e| e.point).collect();
        assert_eq!(
            order,
            vec![
                GridPoint::new(2, 3),
                GridPoint::new(2, 7),
                GridPoint::new(9, 9),
                GridPoint::new(4, 4),
                GridPoint::new(0, 0),
            ]
        );
    }

    #[test]
    fn test_open_floor_diagonal_route() {
        // 40x40 floor at pitch 2 is a 20x20 grid; (0, 0) lands in cell (10, 10)
        let grid = FloorGrid::build(40.0, 40.0, 2.0, &[]).unwrap();
        let start = WorldPoint::new(0.0, 0.0);
        let end = WorldPoint::new(19.0, 19.0);

        let result = PathPlanner::new(&grid).find_path_detailed(start, end).unwrap();
        assert!(result.is_success());

        let start_cell = grid.world_to_cell(start).unwrap();
        let goal_cell = grid.world_to_cell(end).unwrap();
        assert_eq!(result.cells.first(), Some(&start_cell));
        assert_eq!(result.cells.last(), Some(&goal_cell));
        assert_eq!(result.cells.len() - 1, start_cell.chebyshev_distance(&goal_cell));
        assert_eq!(result.total_cost, Some(9));
        assert_connected(&result.cells);

        // Waypoints are cell centers
        let first = result.path.start().unwrap();
        assert!((first.x - 1.0).abs() < 1e-6 && (first.z - 1.0).abs() < 1e-6);
        let last = result.path.goal().unwrap();
        assert!((last.x - 19.0).abs() < 1e-6 && (last.z - 19.0).abs() < 1e-6);
    }

    #[test]
    fn test_routes_around_single_obstacle() {
        // Cell (10, 10) sits between the start at (6, 10) and the goal at (14, 10)
        let obstacles = [Obstacle::new(0.5, 0.5, 1.0, 1.0)];
        let grid = FloorGrid::build(20.0, 20.0, 1.0, &obstacles).unwrap();
        let blocked = GridPoint::new(10, 10);
        assert!(!grid.is_walkable(10, 10).unwrap());

        let start = WorldPoint::new(-3.5, 0.5);
        let end = WorldPoint::new(4.5, 0.5);
        let result = PathPlanner::new(&grid).find_path_detailed(start, end).unwrap();

        assert!(result.is_success());
        assert!(!result.cells.contains(&blocked), "Route must avoid the blocked cell");
        assert_connected(&result.cells);

        let straight = start.distance(&end);
        let metrics = result.path.metrics();
        assert!(
            metrics.distance > straight + 0.5,
            "Detour {} should be longer than the straight line {}",
            metrics.distance,
            straight
        );
    }

    #[test]
    fn test_start_or_end_outside_floor() {
        let grid = FloorGrid::build(40.0, 40.0, 2.0, &[]).unwrap();
        let inside = WorldPoint::new(0.0, 0.0);
        let outside = WorldPoint::new(25.0, 0.0);

        let err = find_path(&grid, outside, inside).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidWorldCoordinates(_)));
        assert!(err.is_out_of_bounds());

        let err = find_path(&grid, inside, WorldPoint::new(0.0, -40.0)).unwrap_err();
        assert!(err.is_out_of_bounds());
        // World points never use the cell-index variant
        assert!(!matches!(err, NavigationError::OutOfBounds(_)));
    }

    #[test]
    fn test_find_path_cells_out_of_bounds() {
        let grid = FloorGrid::build(5.0, 5.0, 1.0, &[]).unwrap();
        let planner = PathPlanner::new(&grid);
        assert!(matches!(
            planner.find_path_cells(GridPoint::new(0, 0), GridPoint::new(5, 0)),
            Err(NavigationError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_no_route_is_empty_not_error() {
        // A full column of blocked cells at col 5 of a 10x10 grid
        let wall: Vec<Obstacle> = (0..10)
            .map(|row| Obstacle::new(0.5, row as f32 - 4.5, 1.0, 1.0))
            .collect();
        let grid = FloorGrid::build(10.0, 10.0, 1.0, &wall).unwrap();
        assert_eq!(grid.blocked_count(), 10);

        let result = PathPlanner::new(&grid)
            .find_path_detailed(WorldPoint::new(-3.5, 0.0), WorldPoint::new(3.5, 0.0))
            .unwrap();
        assert!(!result.is_success());
        assert!(result.path.is_empty());
        assert!(result.cells.is_empty());
        assert!(result.total_cost.is_none());
        assert!(result.nodes_explored > 0);
        assert!(format!("{}", result).contains("success: false"));
    }

    #[test]
    fn test_same_start_and_goal() {
        let grid = FloorGrid::build(5.0, 5.0, 1.0, &[]).unwrap();
        let result = PathPlanner::new(&grid)
            .find_path_cells(GridPoint::new(2, 2), GridPoint::new(2, 2))
            .unwrap();
        assert_eq!(result.cells, vec![GridPoint::new(2, 2)]);
        assert_eq!(result.total_cost, Some(0));
        assert_eq!(result.path.len(), 1);
    }

    #[test]
    fn test_blocked_start_is_kept_blocked_goal_unreachable() {
        let grid = FloorGrid::build(5.0, 5.0, 1.0, &[Obstacle::new(0.0, 0.0, 1.0, 1.0)]).unwrap();
        let planner = PathPlanner::new(&grid);
        let blocked = GridPoint::new(2, 2);

        let from_blocked = planner.find_path_cells(blocked, GridPoint::new(4, 4)).unwrap();
        assert!(from_blocked.is_success());
        assert_eq!(from_blocked.cells[0], blocked);

        let into_blocked = planner.find_path_cells(GridPoint::new(0, 0), blocked).unwrap();
        assert!(!into_blocked.is_success());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let obstacles = [
            Obstacle::new(-5.0, -5.0, 2.0, 2.0),
            Obstacle::new(0.0, -5.0, 2.0, 2.0),
            Obstacle::new(5.0, -5.0, 2.0, 2.0),
            Obstacle::new(-5.0, 0.0, 2.0, 2.0),
            Obstacle::new(0.0, 0.0, 2.0, 2.0),
            Obstacle::new(5.0, 0.0, 2.0, 2.0),
        ];
        let grid = FloorGrid::build(20.0, 20.0, 1.0, &obstacles).unwrap();
        let planner = PathPlanner::new(&grid);
        let start = WorldPoint::new(-9.5, -9.5);
        let end = WorldPoint::new(9.5, 9.5);

        let first = planner.find_path_detailed(start, end).unwrap();
        let second = planner.find_path_detailed(start, end).unwrap();
        assert!(first.is_success());
        assert_eq!(first, second);

        // An unrelated call in between must not leak into the next one
        let _ = planner.find_path(WorldPoint::new(9.5, -9.5), WorldPoint::new(-9.5, 9.5)).unwrap();
        let third = planner.find_path_detailed(start, end).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_open_floor_always_has_route() {
        let grid = FloorGrid::build(30.0, 30.0, 1.0, &[]).unwrap();
        let planner = PathPlanner::new(&grid);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let start = WorldPoint::new(rng.random_range(-14.9..14.9), rng.random_range(-14.9..14.9));
            let end = WorldPoint::new(rng.random_range(-14.9..14.9), rng.random_range(-14.9..14.9));
            let result = planner.find_path_detailed(start, end).unwrap();

            assert!(result.is_success(), "No route from {} to {}", start, end);
            assert_eq!(result.cells[0], grid.world_to_cell(start).unwrap());
            assert_eq!(*result.cells.last().unwrap(), grid.world_to_cell(end).unwrap());
            assert_connected(&result.cells);
        }
    }

    #[test]
    fn test_route_cells_are_walkable_and_cost_matches_steps() {
        let mut rng = StdRng::seed_from_u64(42);
        let obstacles: Vec<Obstacle> = (0..120)
            .map(|_| {
                Obstacle::new(
                    rng.random_range(-12.0..12.0),
                    rng.random_range(-12.0..12.0),
                    1.0,
                    1.0,
                )
            })
            .collect();
        let grid = FloorGrid::build(24.0, 24.0, 1.0, &obstacles).unwrap();
        let planner = PathPlanner::new(&grid);

        let mut found = 0;
        for _ in 0..40 {
            let start = GridPoint::new(rng.random_range(0..grid.cols()), rng.random_range(0..grid.rows()));
            let goal = GridPoint::new(rng.random_range(0..grid.cols()), rng.random_range(0..grid.rows()));
            let result = planner.find_path_cells(start, goal).unwrap();
            if !result.is_success() {
                continue;
            }
            found += 1;

            assert_eq!(result.total_cost, Some(result.cells.len() - 1));
            assert_eq!(result.path.metrics().grid_steps, result.cells.len() - 1);
            assert_connected(&result.cells);
            let interior = result.cells.iter().skip(1).take(result.cells.len().saturating_sub(2));
            for p in interior {
                assert!(grid.is_walkable(p.col, p.row).unwrap(), "Route crosses blocked cell {}", p);
            }
            // The goal is only entered through the walkability check
            if result.cells.len() > 1 {
                assert!(grid.is_walkable(goal.col, goal.row).unwrap());
            }
        }
        assert!(found > 0, "Expected at least one reachable pair");
    }
}
