//! Planned routes and the travel estimates derived from them.

use std::fmt;

use crate::map::WorldPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Speed used for travel-time estimates, in floor units per second.
///
/// This is a planning constant and is unrelated to the speed configured on
/// any individual shuttle.
pub const REFERENCE_SPEED: f32 = 1.0;

/// An ordered sequence of waypoints from start to goal.
///
/// Each waypoint is the center of a traversed cell. An empty path means the
/// planner found no route.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    waypoints: Vec<WorldPoint>,
}

impl Path {
    /// Creates a path from waypoints ordered start to goal.
    pub fn new(waypoints: Vec<WorldPoint>) -> Self {
        Self { waypoints }
    }

    /// The empty "no route" path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when no route was found.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Waypoints ordered start to goal.
    pub fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// First waypoint, if any.
    pub fn start(&self) -> Option<&WorldPoint> {
        self.waypoints.first()
    }

    /// Last waypoint, if any.
    pub fn goal(&self) -> Option<&WorldPoint> {
        self.waypoints.last()
    }

    /// Distance and time estimates for this path.
    pub fn metrics(&self) -> PathMetrics {
        PathMetrics::from_path(self)
    }

    /// Consumes the path, returning its waypoints.
    pub fn into_waypoints(self) -> Vec<WorldPoint> {
        self.waypoints
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a WorldPoint;
    type IntoIter = std::slice::Iter<'a, WorldPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

/// Travel estimates for a planned path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathMetrics {
    /// Summed straight-line length of the path segments, in floor units.
    pub distance: f32,
    /// Travel time at [`REFERENCE_SPEED`], in seconds.
    pub estimated_time: f32,
    /// Number of cell-to-cell moves.
    pub grid_steps: usize,
}

impl PathMetrics {
    /// Computes the metrics of a path.
    ///
    /// Waypoints are already in floor units, so the segment lengths carry the
    /// grid pitch as their scale. Paths with fewer than two waypoints have zero
    /// distance and time.
    pub fn from_path(path: &Path) -> Self {
        let distance: f32 = path
            .waypoints()
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum();

        Self {
            distance,
            estimated_time: distance / REFERENCE_SPEED,
            grid_steps: path.len().saturating_sub(1),
        }
    }
}

impl fmt::Display for PathMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance: {:.2}, estimated time: {:.1} s, steps: {}",
            self.distance, self.estimated_time, self.grid_steps
        )
    }
}
