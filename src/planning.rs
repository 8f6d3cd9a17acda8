use tracing::{info, warn};

use fabsim_navigation::{FloorGrid, find_path};

use crate::blackboard::{Blackboard, RouteOutcome, RouteSummary, raise_fault, record_route};
use crate::config::RouteConfig;

/// Plans every configured route once and records the outcomes.
///
/// A route with a point off the floor is logged, recorded as a fault and
/// skipped; the remaining routes still run. Returns the number of routes
/// that produced a path.
pub fn plan_routes(grid: &FloorGrid, routes: &[RouteConfig], bb: &Blackboard) -> usize {
    info!(routes = routes.len(), "Planning configured routes.");
    let mut planned = 0;

    for (index, route) in routes.iter().enumerate() {
        let (start, end) = route.points();
        let outcome = match find_path(grid, start, end) {
            Ok(path) if path.is_empty() => {
                info!(route = index, %start, %end, "No route between the requested points.");
                RouteOutcome::NoPath
            }
            Ok(path) => {
                let metrics = path.metrics();
                info!(route = index, %start, %end, waypoints = path.len(), %metrics, "Route planned.");
                planned += 1;
                RouteOutcome::Planned(metrics)
            }
            Err(e) => {
                warn!(route = index, %start, %end, error = %e, "Route rejected.");
                raise_fault(bb, &format!("route {} rejected: {}", index, e));
                RouteOutcome::Rejected(e.to_string())
            }
        };
        record_route(bb, RouteSummary { start, end, outcome });
    }

    planned
}
