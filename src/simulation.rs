use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use gridscout_kinematics::Twist;
use gridscout_mapping::{RangeSensor, World, WorldPoint};
use spin_sleep::SpinSleeper;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::blackboard::{Blackboard, State, clear_fault, raise_fault, touch_cmd};
use crate::bus::{self, Closed};

pub const MOTION_FAULT: &str = "motion integration failed";
pub const TELEOP_TIMEOUT: &str = "teleop timeout";

/// Everything a tick needs besides the shared state.
#[derive(Debug, Clone)]
pub struct Simulator {
    sensor: RangeSensor,
    world: World,
    dt: f64,
}

impl Simulator {
    pub fn new(sensor: RangeSensor, world: World, tick: Duration) -> Self {
        Self {
            sensor,
            world,
            dt: tick.as_secs_f64(),
        }
    }

    /// Advances the state by one tick: move, sense, map.
    pub fn step(&self, state: &mut State) -> anyhow::Result<()> {
        let pose = state
            .pose
            .advance(state.twist, self.dt)
            .with_context(|| format!("advancing {} by {}", state.pose, state.twist))?;

        let reading = self.sensor.cast(&pose, &self.world.obstacles);
        state.grid.update(&pose, reading, self.sensor.max_range());

        state.pose = pose;
        state.reading = reading;
        state.tick += 1;
        state.record_path(WorldPoint::from(pose));
        Ok(())
    }
}

/// Fixed-rate simulation loop. Runs on its own thread until `shutdown` is set
/// or the command topic closes.
pub fn run_simulation_loop(
    bb: Blackboard,
    mut cmd_rx: broadcast::Receiver<Arc<Twist>>,
    sim: Simulator,
    tick: Duration,
    shutdown: Arc<AtomicBool>,
) {
    info!(tick_ms = tick.as_millis() as u64, "Simulation thread started.");
    let sleeper = SpinSleeper::default();

    while !shutdown.load(Ordering::Relaxed) {
        let started = Instant::now();

        match bus::latest(&mut cmd_rx) {
            Ok(Some(twist)) => {
                bb.write().twist = *twist;
                touch_cmd(&bb);
                clear_fault(&bb, TELEOP_TIMEOUT);
            }
            Ok(None) => {}
            Err(Closed) => {
                info!("Command topic closed. Stopping simulation.");
                break;
            }
        }

        let result = {
            let mut g = bb.write();
            let (width, height) = (g.grid.width(), g.grid.height());
            let result = sim.step(&mut g);
            if (g.grid.width(), g.grid.height()) != (width, height) {
                info!(width = g.grid.width(), height = g.grid.height(), "Map extended");
            }
            if let Err(e) = &result {
                g.twist = Twist::stop();
                error!("Simulation step failed: {:?}. Robot stopped.", e);
            } else {
                debug!(tick = g.tick, pose = %g.pose, reading = g.reading, "Simulation step");
            }
            result
        };
        if result.is_err() {
            raise_fault(&bb, MOTION_FAULT);
        }

        sleeper.sleep(tick.saturating_sub(started.elapsed()));
    }

    info!("Simulation thread finished.");
}
