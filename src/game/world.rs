//! Shared world registry: every player and obstacle in the single lane

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::GameConfig;
use crate::ws::protocol::ServerMsg;

use super::cooldown::{Action, Cooldown};

/// Per-connection integer handle
pub type PlayerId = u64;

/// Bounded outbound channel of one session. Dropping it closes the socket writer.
pub type Outbox = mpsc::Sender<ServerMsg>;

/// World state behind the one lock every component goes through
pub type SharedWorld = Arc<Mutex<WorldState>>;

/// Authoritative player state
#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub position_x: f64,
    /// Height above ground, never negative
    pub position_y: f64,
    pub velocity_y: f64,
    pub alive: bool,
    pub dash: Cooldown,
    pub obstacle_push: Cooldown,
    outbox: Outbox,
}

impl Player {
    /// New player at the spawn point with both cooldowns ready
    pub fn spawn(id: PlayerId, outbox: Outbox, config: &GameConfig) -> Self {
        Self {
            id,
            position_x: config.spawn_x,
            position_y: 0.0,
            velocity_y: config.spawn_velocity_y,
            alive: true,
            dash: Cooldown::ready(),
            obstacle_push: Cooldown::ready(),
            outbox,
        }
    }

    /// Back to spawn defaults. Outstanding cooldown timers go stale.
    pub fn respawn(&mut self, config: &GameConfig) {
        self.alive = true;
        self.position_x = config.spawn_x;
        self.position_y = 0.0;
        self.velocity_y = config.spawn_velocity_y;
        self.dash.reset();
        self.obstacle_push.reset();
    }

    pub fn is_grounded(&self) -> bool {
        self.position_y == 0.0
    }

    pub fn cooldown_mut(&mut self, action: Action) -> &mut Cooldown {
        match action {
            Action::Dash => &mut self.dash,
            Action::ObstaclePush => &mut self.obstacle_push,
        }
    }

    /// Queue a message for this session without waiting.
    /// Returns false when the session is gone or its outbox is full.
    pub fn send(&self, msg: ServerMsg) -> bool {
        self.outbox.try_send(msg).is_ok()
    }
}

/// Scrolling obstacle, shared by every player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position_x: f64,
}

/// The whole game world
#[derive(Debug, Default)]
pub struct WorldState {
    /// Players keyed by id, iterated in id order
    pub players: BTreeMap<PlayerId, Player>,
    /// Obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    last_id: PlayerId,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared lock
    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    /// Next handle, starting at 1. Handles are never reused.
    pub fn allocate_id(&mut self) -> PlayerId {
        self.last_id += 1;
        self.last_id
    }

    pub fn spawn_obstacle(&mut self, position_x: f64) {
        self.obstacles.push(Obstacle { position_x });
    }

    /// Count alive players
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.alive).count()
    }
}
