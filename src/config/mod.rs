//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated, permissive when unset)
    pub client_origin: Option<String>,
    /// Max inbound messages per second per session
    pub input_rate_limit: u32,
    /// Simulation tunables
    pub game: GameConfig,
}

/// Tunables for the simulation and the command rules.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Period of one simulation tick
    pub tick_period: Duration,
    /// Obstacle scroll distance per tick
    pub obstacle_speed: f64,
    /// Delay before a used dash/push becomes ready again
    pub cooldown: Duration,
    /// Lower bound of the obstacle spawn interval (inclusive)
    pub spawn_interval_min: Duration,
    /// Upper bound of the obstacle spawn interval (exclusive)
    pub spawn_interval_max: Duration,
    /// Fixed RNG seed for obstacle spawning, entropy when `None`
    pub obstacle_seed: Option<u64>,

    pub lane_min_x: f64,
    pub lane_max_x: f64,
    pub move_step: f64,
    pub jump_velocity: f64,
    pub dash_distance: f64,
    pub push_distance: f64,
    pub gravity: f64,

    pub spawn_x: f64,
    pub spawn_velocity_y: f64,

    /// Horizontal reach of the player hitbox
    pub hitbox_width: f64,
    /// Players at or below this height can be hit
    pub hit_height: f64,
    pub obstacle_spawn_x: f64,
    /// Obstacles left of this are pruned
    pub obstacle_despawn_x: f64,

    /// Messages a session may have queued before it counts as stalled
    pub outbox_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(10),
            obstacle_speed: 5.0,
            cooldown: Duration::from_secs(10),
            spawn_interval_min: Duration::from_millis(1000),
            spawn_interval_max: Duration::from_millis(3000),
            obstacle_seed: None,
            lane_min_x: 0.0,
            lane_max_x: 1000.0,
            move_step: 20.0,
            jump_velocity: 25.0,
            dash_distance: 200.0,
            push_distance: 200.0,
            gravity: 1.0,
            spawn_x: 500.0,
            spawn_velocity_y: 15.0,
            hitbox_width: 50.0,
            hit_height: 50.0,
            obstacle_spawn_x: 2000.0,
            obstacle_despawn_x: -20.0,
            outbox_capacity: 256,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by whichever tunables are set in the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    /// Same as [`GameConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_ms =
            parse_var(lookup, "TICK_MS")?.unwrap_or(defaults.tick_period.as_millis() as u64);
        if tick_ms == 0 {
            return Err(ConfigError::Invalid("TICK_MS"));
        }

        let spawn_min_ms = parse_var(lookup, "SPAWN_MIN_MS")?
            .unwrap_or(defaults.spawn_interval_min.as_millis() as u64);
        let spawn_max_ms = parse_var(lookup, "SPAWN_MAX_MS")?
            .unwrap_or(defaults.spawn_interval_max.as_millis() as u64);
        if spawn_min_ms == 0 {
            return Err(ConfigError::Invalid("SPAWN_MIN_MS"));
        }
        if spawn_max_ms < spawn_min_ms {
            return Err(ConfigError::Invalid("SPAWN_MAX_MS"));
        }

        let outbox_capacity =
            parse_var(lookup, "OUTBOX_CAPACITY")?.unwrap_or(defaults.outbox_capacity);
        if outbox_capacity == 0 {
            return Err(ConfigError::Invalid("OUTBOX_CAPACITY"));
        }

        Ok(Self {
            tick_period: Duration::from_millis(tick_ms),
            obstacle_speed: parse_var(lookup, "OBSTACLE_SPEED")?.unwrap_or(defaults.obstacle_speed),
            cooldown: parse_var(lookup, "COOLDOWN_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cooldown),
            spawn_interval_min: Duration::from_millis(spawn_min_ms),
            spawn_interval_max: Duration::from_millis(spawn_max_ms),
            obstacle_seed: parse_var(lookup, "OBSTACLE_SEED")?,
            outbox_capacity,
            ..defaults
        })
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR for hosted deployments
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port.trim()),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let input_rate_limit = parse_var(lookup, "INPUT_RATE_LIMIT")?.unwrap_or(200);
        if input_rate_limit == 0 {
            return Err(ConfigError::Invalid("INPUT_RATE_LIMIT"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN").filter(|s| !s.trim().is_empty()),
            input_rate_limit,
            game: GameConfig::from_lookup(lookup)?,
        })
    }

    /// Loopback config around the given tunables
    #[cfg(test)]
    pub fn local(game: GameConfig) -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_level: "debug".to_string(),
            client_origin: None,
            input_rate_limit: 200,
            game,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
