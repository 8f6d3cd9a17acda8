use spin_sleep::SpinSleeper;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use fabsim_kinematics::{FleetSnapshot, RailMotionModel};

use crate::blackboard::{Blackboard, record_tick};
use crate::bus::Topic;

/// Applies one tick, stores the result on the blackboard and publishes it.
pub fn step(model: &mut RailMotionModel, bb: &Blackboard, fleet_topic: &Topic<FleetSnapshot>) -> FleetSnapshot {
    model.advance_all();
    let snapshot = model.snapshot();
    record_tick(bb, &snapshot);
    fleet_topic.publish(snapshot.clone());
    snapshot
}

/// Spawns the fixed-rate motion thread.
///
/// The thread ticks until `running` is cleared and then hands the model back
/// through the join handle.
pub fn spawn_motion_thread(
    mut model: RailMotionModel,
    period: Duration,
    bb: Blackboard,
    fleet_topic: Topic<FleetSnapshot>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<RailMotionModel>> {
    thread::Builder::new().name("motion".into()).spawn(move || {
        info!(?period, shuttles = model.len(), "Motion thread started.");
        let sleeper = SpinSleeper::new(10_000);
        let mut deadline = Instant::now();

        while running.load(Ordering::Acquire) {
            let snapshot = step(&mut model, &bb, &fleet_topic);
            if snapshot.tick % 600 == 0 {
                debug!(tick = snapshot.tick, "Fleet advanced");
            }

            deadline += period;
            match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) => sleeper.sleep(remaining),
                None => {
                    warn!(tick = snapshot.tick, "Motion tick overran its period");
                    deadline = Instant::now();
                }
            }
        }

        info!(tick = model.tick(), "Motion thread stopped.");
        model
    })
}
