//! This module defines the error types used by the `fabsim-navigation` crate.

#![warn(missing_docs)]

/// Error type for floor grid and planning operations.
///
/// Variants fall into two families. Configuration errors (`InvalidPitch`,
/// `InvalidDimensions`, `InvalidObstacle`) are only produced while building a
/// [`FloorGrid`](crate::map::FloorGrid) and are fatal to that construction.
/// Out-of-bounds errors (`OutOfBounds`, `InvalidWorldCoordinates`) are
/// produced by lookups and planning requests and are recoverable.
///
/// A search that finds no route is not an error; it returns an empty path.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// Error for an invalid grid pitch.
    /// This variant is returned when the pitch is not a positive, finite number.
    InvalidPitch(&'static str),
    /// Error for invalid floor dimensions.
    /// This variant is returned when the floor width or height is not positive,
    /// or when the resulting cell count cannot be allocated.
    InvalidDimensions(&'static str),
    /// Error for an obstacle that cannot be placed on the floor.
    InvalidObstacle(&'static str),
    /// Error for out-of-bounds cell access.
    /// This variant is returned when a column or row index falls outside the grid.
    OutOfBounds(&'static str),
    /// Error for world coordinates that do not map into the grid.
    InvalidWorldCoordinates(&'static str),
}

impl NavigationError {
    /// Returns true for errors raised while building a grid from its configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NavigationError::InvalidPitch(_)
                | NavigationError::InvalidDimensions(_)
                | NavigationError::InvalidObstacle(_)
        )
    }

    /// Returns true for errors raised by a cell lookup or planning request that
    /// fell outside the floor.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            NavigationError::OutOfBounds(_) | NavigationError::InvalidWorldCoordinates(_)
        )
    }
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationError::InvalidPitch(msg) => write!(f, "Invalid grid pitch: {}", msg),
            NavigationError::InvalidDimensions(msg) => write!(f, "Invalid floor dimensions: {}", msg),
            NavigationError::InvalidObstacle(msg) => write!(f, "Invalid obstacle: {}", msg),
            NavigationError::OutOfBounds(msg) => write!(f, "Grid access out of bounds: {}", msg),
            NavigationError::InvalidWorldCoordinates(msg) => {
                write!(f, "Invalid world coordinates: {}", msg)
            }
        }
    }
}

impl core::error::Error for NavigationError {}
