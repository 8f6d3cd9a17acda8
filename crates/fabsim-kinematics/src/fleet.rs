//! A fleet of shuttles sharing one rail segment.

use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{KinematicsError, RailSegment, Shuttle};

/// Fleet state at a given tick, as handed to a renderer or logger.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetSnapshot {
    /// Number of ticks applied since the model was created.
    pub tick: u64,
    /// Shuttle states, in the order they were added.
    pub shuttles: Vec<Shuttle>,
}

/// Owns the shuttles on a rail segment and advances them once per tick.
///
/// Every shuttle follows [`RailSegment::advance`] independently; there is no
/// collision avoidance or ordering between shuttles, and the model has no
/// terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct RailMotionModel {
    rail: RailSegment,
    shuttles: Vec<Shuttle>,
    tick: u64,
}

impl RailMotionModel {
    /// Creates a model for a fixed fleet.
    ///
    /// # Errors
    ///
    /// Returns the first validation error from [`RailSegment::validate`].
    pub fn new(rail: RailSegment, shuttles: Vec<Shuttle>) -> Result<Self, KinematicsError> {
        for shuttle in &shuttles {
            rail.validate(shuttle)?;
        }
        Ok(Self { rail, shuttles, tick: 0 })
    }

    /// Advances every shuttle by one tick and returns the updated states.
    pub fn advance_all(&mut self) -> &[Shuttle] {
        let rail = self.rail;
        for shuttle in &mut self.shuttles {
            *shuttle = rail.advance(*shuttle);
        }
        self.tick += 1;
        &self.shuttles
    }

    /// Advances every shuttle by a fraction (or multiple) of a tick.
    ///
    /// The tick counter only counts whole [`advance_all`](Self::advance_all)
    /// steps and is not changed here.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `tick_ratio` is
    /// negative; no shuttle is moved in that case.
    pub fn advance_all_by(&mut self, tick_ratio: f64) -> Result<&[Shuttle], KinematicsError> {
        if !tick_ratio.is_finite() || tick_ratio < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
        }
        let rail = self.rail;
        for shuttle in &mut self.shuttles {
            *shuttle = rail.advance_by(*shuttle, tick_ratio)?;
        }
        Ok(&self.shuttles)
    }

    /// Applies `ticks` whole ticks.
    pub fn advance_ticks(&mut self, ticks: u64) -> &[Shuttle] {
        for _ in 0..ticks {
            self.advance_all();
        }
        &self.shuttles
    }

    /// Current shuttle states.
    pub fn shuttles(&self) -> &[Shuttle] {
        &self.shuttles
    }

    /// State of one shuttle.
    pub fn shuttle(&self, index: usize) -> Option<&Shuttle> {
        self.shuttles.get(index)
    }

    /// Number of shuttles in the fleet.
    pub fn len(&self) -> usize {
        self.shuttles.len()
    }

    /// Returns true if the fleet has no shuttles.
    pub fn is_empty(&self) -> bool {
        self.shuttles.is_empty()
    }

    /// Whole ticks applied so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The rail all shuttles travel on.
    pub fn rail(&self) -> &RailSegment {
        &self.rail
    }

    /// Copies the current fleet state.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            tick: self.tick,
            shuttles: self.shuttles.clone(),
        }
    }
}

impl fmt::Display for RailMotionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RailMotionModel ({}, {} shuttles, tick {})", self.rail, self.shuttles.len(), self.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use alloc::vec;

    fn three_shuttle_fleet() -> RailMotionModel {
        let rail = RailSegment::new(-15.0, 15.0).unwrap();
        let shuttles = [-15.0, -5.0, 5.0]
            .into_iter()
            .map(|x| rail.place(x, Direction::Forward, 0.05).unwrap())
            .collect();
        RailMotionModel::new(rail, shuttles).unwrap()
    }

    #[test]
    fn test_model_rejects_invalid_shuttles() {
        let rail = RailSegment::new(-1.0, 1.0).unwrap();
        let result = RailMotionModel::new(rail, vec![Shuttle::new(2.0, Direction::Forward, 0.1)]);
        assert!(matches!(result, Err(KinematicsError::PositionOutOfRange(_))));
    }

    #[test]
    fn test_three_shuttles_reverse_independently() {
        let mut model = three_shuttle_fleet();
        let mut first_reversal: [Option<(u64, f64)>; 3] = [None; 3];

        for _ in 0..700 {
            let tick = model.tick() + 1;
            for (i, shuttle) in model.advance_all().iter().enumerate() {
                if first_reversal[i].is_none() && shuttle.direction == Direction::Reverse {
                    first_reversal[i] = Some((tick, shuttle.x));
                }
            }
        }

        // Roughly (15 - start) / 0.05 ticks: 600, 400, 200
        let expected_ticks = [600u64, 400, 200];
        for (i, reversal) in first_reversal.iter().enumerate() {
            let (tick, x) = reversal.expect("shuttle never reversed");
            assert!(tick.abs_diff(expected_ticks[i]) <= 1, "shuttle {} reversed at tick {}", i, tick);
            assert!(x >= 15.0, "reversal fired before reaching the bound");
            assert!(x - 15.0 <= 0.05 + 1e-9, "overshoot {} larger than one tick", x - 15.0);
        }

        // The first shuttle is back below the bound and heading for -15
        let first = model.shuttle(0).unwrap();
        assert_eq!(first.direction, Direction::Reverse);
        assert!(first.x < 15.0);
    }

    #[test]
    fn test_shuttles_do_not_affect_each_other() {
        let mut fleet = three_shuttle_fleet();
        let rail = *fleet.rail();
        let mut alone = RailMotionModel::new(rail, vec![*fleet.shuttle(1).unwrap()]).unwrap();

        for _ in 0..1_000 {
            fleet.advance_all();
            alone.advance_all();
            assert_eq!(fleet.shuttle(1), alone.shuttle(0));
        }
    }

    #[test]
    fn test_motion_is_deterministic() {
        let mut a = three_shuttle_fleet();
        let mut b = three_shuttle_fleet();
        for _ in 0..2_500 {
            let left: Vec<(u64, u64)> = a.advance_all().iter().map(|s| (s.x.to_bits(), s.direction as u64)).collect();
            let right: Vec<(u64, u64)> = b.advance_all().iter().map(|s| (s.x.to_bits(), s.direction as u64)).collect();
            assert_eq!(left, right);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_positions_stay_within_one_tick_of_bounds() {
        let mut model = three_shuttle_fleet();
        for _ in 0..3_000 {
            for shuttle in model.advance_all() {
                assert!(shuttle.x <= 15.0 + 0.05 + 1e-9);
                assert!(shuttle.x >= -15.0 - 0.05 - 1e-9);
            }
        }
    }

    #[test]
    fn test_tick_counter_and_snapshot() {
        let mut model = three_shuttle_fleet();
        assert_eq!(model.tick(), 0);
        assert_eq!(model.len(), 3);
        model.advance_ticks(10);
        assert_eq!(model.tick(), 10);

        let snapshot = model.snapshot();
        assert_eq!(snapshot.tick, 10);
        assert_eq!(snapshot.shuttles.as_slice(), model.shuttles());

        model.advance_all_by(0.5).unwrap();
        assert_eq!(model.tick(), 10);
        assert!(matches!(model.advance_all_by(-1.0), Err(KinematicsError::NegativeTimeDelta(_))));
    }

    #[test]
    fn test_empty_fleet() {
        let rail = RailSegment::new(0.0, 1.0).unwrap();
        let mut model = RailMotionModel::new(rail, Vec::new()).unwrap();
        assert!(model.is_empty());
        assert!(model.advance_all().is_empty());
        assert_eq!(model.tick(), 1);
    }
}
