use std::{env, time::Duration};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use fabsim_kinematics::{Direction, KinematicsError, RailMotionModel, RailSegment};
use fabsim_navigation::{FloorGrid, NavigationError, Obstacle, WorldPoint};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const CONFIG_PATH_VAR: &str = "FABSIM_CONFIG";
const ENV_PREFIX: &str = "FABSIM";

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Wall-clock run duration in seconds.
    pub run_secs: f64,
    pub floor: FloorConfig,
    pub rail: RailConfig,
    #[serde(default)]
    pub shuttles: Vec<ShuttleConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloorConfig {
    pub width: f32,
    pub height: f32,
    pub pitch: f32,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RailConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub tick_hz: f64,
    pub stall_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShuttleConfig {
    pub x: f64,
    /// `1` or `-1`.
    pub direction: i8,
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl RouteConfig {
    pub fn points(&self) -> (WorldPoint, WorldPoint) {
        (WorldPoint::from(self.start), WorldPoint::from(self.end))
    }
}

impl FloorConfig {
    pub fn build_grid(&self) -> Result<FloorGrid, NavigationError> {
        FloorGrid::build(self.width, self.height, self.pitch, &self.obstacles)
    }
}

impl RailConfig {
    /// Only call on a validated config; `1 / tick_hz` must fit in a `Duration`.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }
}

impl SimulationConfig {
    /// Only call on a validated config.
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs_f64(self.run_secs)
    }

    /// Places every configured shuttle on the rail.
    pub fn build_fleet(&self) -> Result<RailMotionModel, KinematicsError> {
        let rail = RailSegment::new(self.rail.x_min, self.rail.x_max)?;
        let shuttles = self
            .shuttles
            .iter()
            .map(|s| rail.place(s.x, Direction::try_from(s.direction)?, s.speed))
            .collect::<Result<Vec<_>, _>>()?;
        RailMotionModel::new(rail, shuttles)
    }

    /// Checks the host-level settings the libraries do not validate.
    fn validate(self) -> Result<Self, ConfigError> {
        if !self.run_secs.is_finite() || self.run_secs < 0.0 {
            return Err(ConfigError::Message("run_secs must be a non-negative number".into()));
        }
        if Duration::try_from_secs_f64(self.run_secs).is_err() {
            return Err(ConfigError::Message("run_secs is too large".into()));
        }
        if !self.rail.tick_hz.is_finite() || self.rail.tick_hz <= 0.0 {
            return Err(ConfigError::Message("rail.tick_hz must be positive".into()));
        }
        if Duration::try_from_secs_f64(1.0 / self.rail.tick_hz).is_err() {
            return Err(ConfigError::Message("rail.tick_hz is too small".into()));
        }
        if self.rail.stall_timeout_ms == 0 {
            return Err(ConfigError::Message("rail.stall_timeout_ms must be positive".into()));
        }
        Ok(self)
    }
}

/// Loads `config/default.toml` (or the file named by `FABSIM_CONFIG`) and
/// applies `FABSIM_` environment overrides, e.g. `FABSIM_RAIL__TICK_HZ=120`.
pub fn load_config() -> Result<SimulationConfig, ConfigError> {
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(&path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<SimulationConfig>())
        .and_then(SimulationConfig::validate);

    match settings {
        Ok(config) => {
            info!(
                shuttles = config.shuttles.len(),
                routes = config.routes.len(),
                obstacles = config.floor.obstacles.len(),
                "Successfully loaded configuration"
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Parses a configuration from TOML text, without environment overrides.
#[cfg(test)]
pub fn from_toml_str(toml: &str) -> Result<SimulationConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<SimulationConfig>()
        .and_then(SimulationConfig::validate)
}
