#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for rail-bound shuttle kinematics."]
#![doc = ""]
#![doc = "Shuttles travel back and forth along a bounded 1-D rail at a constant"]
#![doc = "per-tick speed, reversing when they reach either end of the rail."]

extern crate alloc;

use core::f64::consts::PI;
use core::fmt;
use libm::ceil;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod fleet;

pub use error::KinematicsError;
pub use fleet::{FleetSnapshot, RailMotionModel};

/// Travel direction along the rail axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Towards `x_max` (`+1`).
    #[default]
    Forward,
    /// Towards `x_min` (`-1`).
    Reverse,
}

impl Direction {
    /// The direction as a signed unit, `1.0` or `-1.0`.
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    /// The opposite direction.
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Yaw of a vehicle facing this way, in radians: `0` for forward, `PI`
    /// for reverse.
    pub const fn heading(self) -> f64 {
        match self {
            Direction::Forward => 0.0,
            Direction::Reverse => PI,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = KinematicsError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Reverse),
            _ => Err(KinematicsError::InvalidDirection("must be +1 or -1")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "+1"),
            Direction::Reverse => write!(f, "-1"),
        }
    }
}

/// Kinematic state of one rail-bound shuttle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shuttle {
    /// Position along the rail axis.
    pub x: f64,
    /// Current travel direction.
    pub direction: Direction,
    /// Distance covered per tick. Constant for the life of the shuttle.
    pub speed: f64,
}

impl Shuttle {
    /// Construct a new shuttle.
    ///
    /// Use [`RailSegment::place`] to also check the shuttle against a rail.
    pub const fn new(x: f64, direction: Direction, speed: f64) -> Self {
        Shuttle { x, direction, speed }
    }

    /// Yaw of the shuttle for display, see [`Direction::heading`].
    pub const fn heading(&self) -> f64 {
        self.direction.heading()
    }
}

impl fmt::Display for Shuttle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.3}, dir: {}, v: {:.3}/tick)", self.x, self.direction, self.speed)
    }
}

/// A straight rail segment with fixed travel bounds `[x_min, x_max]`.
///
/// The segment owns the motion rule: a shuttle moves by `direction * speed`
/// each tick, and the bounds are checked after the move. A shuttle whose new
/// position is `>= x_max` turns to [`Direction::Reverse`]; one at `<= x_min`
/// turns to [`Direction::Forward`]. The position is never clamped, so a
/// shuttle can sit past a bound by at most one tick's travel before it heads
/// back.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailSegment {
    x_min: f64,
    x_max: f64,
}

impl RailSegment {
    /// Construct a new rail segment.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidBounds)` if either bound is not
    /// finite or `x_min >= x_max`.
    pub fn new(x_min: f64, x_max: f64) -> Result<Self, KinematicsError> {
        if !x_min.is_finite() || !x_max.is_finite() {
            return Err(KinematicsError::InvalidBounds("must be finite"));
        }
        if x_min >= x_max {
            return Err(KinematicsError::InvalidBounds("x_min must be below x_max"));
        }
        Ok(RailSegment { x_min, x_max })
    }

    /// Returns the lower travel bound.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Returns the upper travel bound.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Length of the travel range.
    pub fn length(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Returns true if `x` lies within the travel bounds.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    /// Creates a shuttle on this rail after validating its initial state.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::PositionOutOfRange)` if `x` lies outside
    /// the bounds, and `Err(KinematicsError::InvalidSpeed)` if `speed` is
    /// negative or not finite.
    pub fn place(&self, x: f64, direction: Direction, speed: f64) -> Result<Shuttle, KinematicsError> {
        let shuttle = Shuttle::new(x, direction, speed);
        self.validate(&shuttle)?;
        Ok(shuttle)
    }

    /// Checks an existing shuttle state against this rail.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RailSegment::place`].
    pub fn validate(&self, shuttle: &Shuttle) -> Result<(), KinematicsError> {
        if !shuttle.speed.is_finite() || shuttle.speed < 0.0 {
            return Err(KinematicsError::InvalidSpeed("must be finite and non-negative"));
        }
        if !self.contains(shuttle.x) {
            return Err(KinematicsError::PositionOutOfRange("shuttle must start within the rail bounds"));
        }
        Ok(())
    }

    /// Advances a shuttle by one tick and returns its new state.
    pub fn advance(&self, shuttle: Shuttle) -> Shuttle {
        self.step(shuttle, 1.0)
    }

    /// Advances a shuttle by a fraction (or multiple) of a tick.
    ///
    /// The displacement is `direction * speed * tick_ratio`; the boundary
    /// rule is the same as for [`RailSegment::advance`].
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `tick_ratio` is
    /// negative or not finite.
    pub fn advance_by(&self, shuttle: Shuttle, tick_ratio: f64) -> Result<Shuttle, KinematicsError> {
        if !tick_ratio.is_finite() || tick_ratio < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
        }
        Ok(self.step(shuttle, tick_ratio))
    }

    fn step(&self, shuttle: Shuttle, tick_ratio: f64) -> Shuttle {
        let x = shuttle.x + shuttle.direction.sign() * shuttle.speed * tick_ratio;

        // Checked after the move, without clamping
        let direction = if x >= self.x_max {
            Direction::Reverse
        } else if x <= self.x_min {
            Direction::Forward
        } else {
            shuttle.direction
        };

        Shuttle { x, direction, ..shuttle }
    }

    /// Predicts how many ticks remain until the shuttle reaches the bound it
    /// is heading for and turns around.
    ///
    /// Returns `None` for a parked shuttle (zero speed). The prediction uses
    /// one division, whereas [`RailSegment::advance`] accumulates the
    /// position tick by tick, so for speeds that are not exact binary
    /// fractions the two can disagree by one tick.
    pub fn ticks_until_reversal(&self, shuttle: &Shuttle) -> Option<u64> {
        if shuttle.speed <= 0.0 {
            return None;
        }
        let remaining = match shuttle.direction {
            Direction::Forward => self.x_max - shuttle.x,
            Direction::Reverse => shuttle.x - self.x_min,
        };
        let ticks = ceil(remaining / shuttle.speed);
        Some(if ticks < 1.0 { 1 } else { ticks as u64 })
    }
}

impl fmt::Display for RailSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RailSegment [{:.2}, {:.2}]", self.x_min, self.x_max)
    }
}
