mod blackboard; // shared host state
mod bus; // broadcast topics between the motion thread and tokio tasks
mod config;
mod monitor;
mod motion;
mod planning;

use anyhow::{Context, anyhow};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use blackboard::{Blackboard, snapshot};
use bus::Topic;
use fabsim_kinematics::FleetSnapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("fabsim started.");

    let cfg = config::load_config().context("failed to load configuration")?;
    let grid = Arc::new(cfg.floor.build_grid().context("failed to build floor grid")?);
    info!(cols = grid.cols(), rows = grid.rows(), blocked = grid.blocked_count(), "Floor grid ready.");
    let model = cfg.build_fleet().context("failed to build shuttle fleet")?;
    info!("{}", model);

    let bb: Blackboard = Arc::default();
    let fleet_topic: Topic<FleetSnapshot> = Topic::new(64);
    let running = Arc::new(AtomicBool::new(true));

    // Subscribe before the first tick so the monitor sees every snapshot
    let fleet_rx = fleet_topic.subscribe();

    info!("Spawning motion thread...");
    let motion = motion::spawn_motion_thread(
        model,
        cfg.rail.tick_period(),
        Arc::clone(&bb),
        fleet_topic.clone(),
        Arc::clone(&running),
    )
    .context("failed to spawn motion thread")?;

    let planner = tokio::task::spawn_blocking({
        let grid = Arc::clone(&grid);
        let routes = cfg.routes.clone();
        let bb = Arc::clone(&bb);
        move || planning::plan_routes(&grid, &routes, &bb)
    });

    let tasks = tokio::spawn({
        let bb = Arc::clone(&bb);
        let running = Arc::clone(&running);
        let stall_timeout = cfg.rail.stall_timeout();
        async move {
            tokio::try_join!(
                monitor::fleet_monitor(fleet_rx),
                monitor::watchdog(bb, stall_timeout, running),
            )
        }
    });

    let planned = planner.await.context("planning task failed")?;
    info!(planned, total = cfg.routes.len(), "Route planning finished.");

    tokio::select! {
        _ = tokio::time::sleep(cfg.run_duration()) => info!("Run duration elapsed."),
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => info!("Ctrl-C received."),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        },
    }

    info!("Shutting down...");
    running.store(false, Ordering::Release);
    let model = motion.join().map_err(|_| anyhow!("motion thread panicked"))?;
    // Last publisher gone; the monitor sees the topic close
    drop(fleet_topic);

    let (reversals, ()) = tasks.await.context("monitor tasks panicked")??;

    let state = snapshot(&bb);
    info!(ticks = model.tick(), last_recorded = state.tick, reversals, faults = state.faults.len(), "Simulation complete.");
    for (i, shuttle) in state.shuttles.iter().enumerate() {
        info!(shuttle = i, "{}", shuttle);
    }
    for (i, route) in state.routes.iter().enumerate() {
        info!(route = i, start = %route.start, end = %route.end, "{}", route.outcome);
    }
    for fault in &state.faults {
        warn!(fault = %fault, "Fault raised during run.");
    }

    Ok(())
}
