use config::{Config, ConfigError, Environment, File, FileFormat};
use gridscout_kinematics::Pose;
use gridscout_mapping::World;
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Complete simulator configuration. Every section falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub window: WindowConfig,
    pub simulation: SimulationConfig,
    pub robot: RobotConfig,
    pub sensor: SensorConfig,
    pub watchdog: WatchdogConfig,
    pub world: World,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "gridscout".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation period in milliseconds
    pub tick_ms: u64,
    /// Initial grid extents in cells
    pub grid_width: usize,
    pub grid_height: usize,
    /// Number of past positions kept for drawing the trail
    pub path_len: usize,
    pub start: Pose,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            grid_width: 80,
            grid_height: 60,
            path_len: 5000,
            start: Pose::new(400.0, 300.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Forward speed in world units per second
    pub speed: f64,
    /// Turn rate in degrees per second
    pub rotation_speed: f64,
    /// Drawing radius in world units
    pub radius: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            speed: 66.0,
            rotation_speed: 66.0,
            radius: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub max_range: f64,
    pub step: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_range: gridscout_mapping::sensor::DEFAULT_MAX_RANGE,
            step: gridscout_mapping::sensor::DEFAULT_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Teleop command age after which the robot is stopped
    pub timeout_ms: u64,
    pub period_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 250,
            period_ms: 25,
        }
    }
}

pub fn load_config() -> Result<SimConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("GRIDSCOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|settings| settings.try_deserialize::<SimConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
