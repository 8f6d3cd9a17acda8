//! Route planning over a fab floor.
//!
//! A [`FloorGrid`](map::FloorGrid) discretizes a rectangular floor with fixed
//! obstacles into walkable and blocked cells. A [`PathPlanner`](astar::PathPlanner)
//! searches that grid with A* and returns the route as cell-center waypoints,
//! from which [`PathMetrics`](path::PathMetrics) derives travel distance and time.

pub mod astar;
pub mod error;
pub mod map;
pub mod path;

pub use astar::{PathPlanner, PathResult, find_path};
pub use error::NavigationError;
pub use map::{FloorGrid, GridCell, GridPoint, Obstacle, WorldPoint};
pub use path::{Path, PathMetrics, REFERENCE_SPEED};
