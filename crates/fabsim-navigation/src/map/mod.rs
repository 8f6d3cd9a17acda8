//! Floor representation for route planning.
//!
//! This module provides the walkability grid built from a floor plan and the
//! point types used to address it in grid and world coordinates.

pub mod floor_grid;
pub mod point_types;

pub use floor_grid::{FloorGrid, GridCell, Obstacle};
pub use point_types::{GridPoint, WorldPoint};
