use parking_lot::RwLock;
use std::{fmt, sync::Arc, time::Instant};

use fabsim_kinematics::{FleetSnapshot, Shuttle};
use fabsim_navigation::{PathMetrics, WorldPoint};

/// Outcome of one configured planning request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A route was found.
    Planned(PathMetrics),
    /// Both points are on the floor but no route connects them.
    NoPath,
    /// The request was rejected, e.g. a point off the floor.
    Rejected(String),
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOutcome::Planned(metrics) => write!(f, "planned ({})", metrics),
            RouteOutcome::NoPath => write!(f, "no path"),
            RouteOutcome::Rejected(reason) => write!(f, "rejected ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub start: WorldPoint,
    pub end: WorldPoint,
    pub outcome: RouteOutcome,
}

#[derive(Clone)]
pub struct State {
    pub shuttles: Vec<Shuttle>,
    pub tick: u64,
    pub last_tick_ts: Instant,
    pub routes: Vec<RouteSummary>,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            shuttles: Vec::new(),
            tick: 0,
            last_tick_ts: Instant::now(),
            routes: Vec::new(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

/// Stores the fleet state after a tick and refreshes the watchdog timestamp.
pub fn record_tick(bb: &Blackboard, fleet: &FleetSnapshot) {
    let mut g = bb.write();
    g.shuttles.clone_from(&fleet.shuttles);
    g.tick = fleet.tick;
    g.last_tick_ts = Instant::now();
}

pub fn record_route(bb: &Blackboard, summary: RouteSummary) {
    bb.write().routes.push(summary);
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabsim_kinematics::Direction;

    #[test]
    fn test_raise_fault_deduplicates() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "motion stalled");
        raise_fault(&bb, "motion stalled");
        raise_fault(&bb, "route 2 rejected");
        assert_eq!(snapshot(&bb).faults, vec!["motion stalled", "route 2 rejected"]);
    }

    #[test]
    fn test_record_tick() {
        let bb: Blackboard = Arc::default();
        let before = snapshot(&bb).last_tick_ts;
        let fleet = FleetSnapshot {
            tick: 42,
            shuttles: vec![Shuttle::new(1.5, Direction::Reverse, 0.05)],
        };
        record_tick(&bb, &fleet);

        let state = snapshot(&bb);
        assert_eq!(state.tick, 42);
        assert_eq!(state.shuttles, fleet.shuttles);
        assert!(state.last_tick_ts >= before);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let bb: Blackboard = Arc::default();
        let copy = snapshot(&bb);
        record_route(
            &bb,
            RouteSummary {
                start: WorldPoint::new(0.0, 0.0),
                end: WorldPoint::new(1.0, 1.0),
                outcome: RouteOutcome::NoPath,
            },
        );
        assert!(copy.routes.is_empty());
        assert_eq!(snapshot(&bb).routes.len(), 1);
    }
}
