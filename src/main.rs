mod blackboard;
mod bus;
mod config;
mod graphics;
mod simulation;
mod teleop;

use anyhow::Context;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use blackboard::{Blackboard, State, new_blackboard, raise_fault};
use bus::Topic;
use config::{SimConfig, WatchdogConfig, load_config};
use gridscout_kinematics::Twist;
use gridscout_mapping::{OccupancyGrid, RangeSensor};
use simulation::{Simulator, TELEOP_TIMEOUT};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("gridscout starting.");
    let config: SimConfig = load_config().context("loading configuration")?;

    let grid = OccupancyGrid::new(config.simulation.grid_width, config.simulation.grid_height)
        .context("creating occupancy grid")?;
    let sensor = RangeSensor::new(config.sensor.max_range, config.sensor.step)
        .context("creating range sensor")?;
    let tick = Duration::from_millis(config.simulation.tick_ms.max(1));

    let bb = new_blackboard(State::new(config.simulation.start, grid, config.simulation.path_len));
    let cmd_topic: Topic<Twist> = Topic::new(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    info!("Spawning simulation thread...");
    let sim_thread = std::thread::Builder::new()
        .name("simulation".into())
        .spawn({
            let bb = Arc::clone(&bb);
            let cmd_rx = cmd_topic.subscribe();
            let shutdown = Arc::clone(&shutdown);
            let sim = Simulator::new(sensor, config.world.clone(), tick);
            move || simulation::run_simulation_loop(bb, cmd_rx, sim, tick, shutdown)
        })
        .context("spawning simulation thread")?;

    let rt = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    rt.spawn({
        let bb = Arc::clone(&bb);
        let watchdog_cfg = config.watchdog.clone();
        async move {
            if let Err(e) = watchdog(bb, watchdog_cfg).await {
                error!("Watchdog failed: {:?}", e);
            }
        }
    });

    macroquad::Window::from_config(
        graphics::window_conf(&config.window),
        graphics::run_visualization_loop(
            Arc::clone(&bb),
            cmd_topic,
            config.robot.clone(),
            config.world.clone(),
            Arc::clone(&shutdown),
        ),
    );

    shutdown.store(true, Ordering::Relaxed);
    if sim_thread.join().is_err() {
        error!("Simulation thread panicked.");
    }
    rt.shutdown_background();
    info!("gridscout finished.");
    Ok(())
}

/// Stops the robot when teleop commands stop arriving.
async fn watchdog(bb: Blackboard, cfg: WatchdogConfig) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let timeout = Duration::from_millis(cfg.timeout_ms);
    let mut tick = tokio::time::interval(Duration::from_millis(cfg.period_ms.max(1)));
    loop {
        tick.tick().await;
        if check_command_age(&bb, timeout) {
            raise_fault(&bb, TELEOP_TIMEOUT);
        }
    }
}

/// Stops a moving robot whose last command is older than `timeout`.
/// Returns `true` if it did.
fn check_command_age(bb: &Blackboard, timeout: Duration) -> bool {
    let mut g = bb.write();
    let age = Instant::now().saturating_duration_since(g.last_cmd_ts);
    if age > timeout && g.twist.is_moving() {
        warn!(?age, twist = %g.twist, "Teleop command timeout! Stopping robot.");
        g.twist = Twist::stop();
        true
    } else {
        false
    }
}
