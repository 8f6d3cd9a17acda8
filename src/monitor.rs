use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use fabsim_kinematics::{FleetSnapshot, Shuttle};

use crate::blackboard::{Blackboard, raise_fault, snapshot};

pub const STALL_FAULT: &str = "motion stalled";

/// Shuttles whose direction changed between two snapshots, with their new state.
pub fn reversals(prev: &FleetSnapshot, next: &FleetSnapshot) -> Vec<(usize, Shuttle)> {
    prev.shuttles
        .iter()
        .zip(&next.shuttles)
        .enumerate()
        .filter(|(_, (before, after))| before.direction != after.direction)
        .map(|(i, (_, after))| (i, *after))
        .collect()
}

/// Logs direction reversals until the fleet topic closes.
/// Returns the number of reversals seen.
pub async fn fleet_monitor(mut fleet_rx: broadcast::Receiver<Arc<FleetSnapshot>>) -> anyhow::Result<u64> {
    info!("Fleet monitor started.");
    let mut last: Option<Arc<FleetSnapshot>> = None;
    let mut count = 0u64;

    loop {
        match fleet_rx.recv().await {
            Ok(current) => {
                if let Some(prev) = &last {
                    for (index, shuttle) in reversals(prev, &current) {
                        count += 1;
                        debug!(tick = current.tick, shuttle = index, x = shuttle.x, direction = %shuttle.direction, "Shuttle reversed");
                    }
                }
                last = Some(current);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Fleet monitor lagged behind the motion thread.");
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!(reversals = count, "Fleet monitor finished.");
    Ok(count)
}

/// Raises a fault if the motion thread has not ticked within `stall_timeout`.
pub async fn watchdog(bb: Blackboard, stall_timeout: Duration, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    info!(?stall_timeout, "Watchdog task started.");
    let period = (stall_timeout / 2).max(Duration::from_millis(1));
    let mut tick = tokio::time::interval(period);
    while running.load(Ordering::Acquire) {
        tick.tick().await;
        let last_tick_ts = snapshot(&bb).last_tick_ts;
        let age = Instant::now() - last_tick_ts;
        if age > stall_timeout && running.load(Ordering::Acquire) {
            warn!(?age, "No motion tick within the stall timeout.");
            raise_fault(&bb, STALL_FAULT);
        }
    }
    info!("Watchdog task finished.");
    Ok(())
}
