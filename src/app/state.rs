//! Application state shared across routes

use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, GameConfig};
use crate::game::{CommandProcessor, SessionManager, SharedWorld, Simulation, WorldState};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game_config: Arc<GameConfig>,
    pub world: SharedWorld,
    pub sessions: SessionManager,
    pub commands: CommandProcessor,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let game_config = Arc::new(config.game.clone());
        let config = Arc::new(config);

        // One world behind one lock, shared by every component
        let world = WorldState::new().into_shared();

        let sessions = SessionManager::new(world.clone(), game_config.clone());
        let commands = CommandProcessor::new(world.clone(), game_config.clone());

        Self {
            config,
            game_config,
            world,
            sessions,
            commands,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Simulation driving this state's world
    pub fn simulation(&self) -> Simulation {
        Simulation::new(self.world.clone(), self.game_config.clone())
    }
}
