//! Command processing: client commands applied to the world

use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::config::GameConfig;
use crate::ws::protocol::ClientMsg;

use super::cooldown::{Action, CooldownScheduler};
use super::world::{PlayerId, SharedWorld, WorldState};

/// Result of applying one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Unknown player, dead player, unmet precondition or unknown command
    Ignored,
}

/// What a command did inside the critical section
enum Effect {
    Ignored,
    Applied,
    /// Applied and consumed a cooldown at the given epoch
    Cooldown(Action, u64),
}

/// Applies client commands under the world lock
#[derive(Clone)]
pub struct CommandProcessor {
    world: SharedWorld,
    config: Arc<GameConfig>,
    cooldowns: CooldownScheduler,
}

impl CommandProcessor {
    pub fn new(world: SharedWorld, config: Arc<GameConfig>) -> Self {
        let cooldowns = CooldownScheduler::new(world.clone(), config.cooldown);
        Self {
            world,
            config,
            cooldowns,
        }
    }

    /// Apply one command from `player_id`. Must run inside a tokio runtime
    /// since cooldown actions spawn their reset timer.
    pub fn apply(&self, player_id: PlayerId, msg: ClientMsg) -> CommandOutcome {
        let effect = {
            let mut world = self.world.lock();
            apply_command(&mut world, &self.config, player_id, msg)
        };

        match effect {
            Effect::Ignored => {
                trace!(player_id, ?msg, "Command ignored");
                CommandOutcome::Ignored
            }
            Effect::Applied => CommandOutcome::Applied,
            Effect::Cooldown(action, epoch) => {
                debug!(player_id, ?action, "Cooldown started");
                self.cooldowns.schedule(player_id, action, epoch);
                CommandOutcome::Applied
            }
        }
    }
}

fn apply_command(
    world: &mut WorldState,
    config: &GameConfig,
    player_id: PlayerId,
    msg: ClientMsg,
) -> Effect {
    let Some(player) = world.players.get_mut(&player_id) else {
        return Effect::Ignored;
    };

    // Restart is the only way back from dead
    if !player.alive && msg != ClientMsg::Restart {
        return Effect::Ignored;
    }

    match msg {
        ClientMsg::Left => {
            if player.position_x > config.lane_min_x {
                player.position_x -= config.move_step;
                return Effect::Applied;
            }
        }
        ClientMsg::Right => {
            if player.position_x < config.lane_max_x {
                player.position_x += config.move_step;
                return Effect::Applied;
            }
        }
        ClientMsg::Jump => {
            if player.is_grounded() {
                player.velocity_y = config.jump_velocity;
                return Effect::Applied;
            }
        }
        ClientMsg::Dash => {
            if let Some(epoch) = player.dash.trigger() {
                player.position_x += config.dash_distance;
                return Effect::Cooldown(Action::Dash, epoch);
            }
        }
        ClientMsg::MoveObstacle => {
            if let Some(epoch) = player.obstacle_push.trigger() {
                for obstacle in &mut world.obstacles {
                    obstacle.position_x += config.push_distance;
                }
                return Effect::Cooldown(Action::ObstaclePush, epoch);
            }
        }
        ClientMsg::Restart => {
            let was_alive = player.alive;
            player.respawn(config);
            info!(player_id, was_alive, "Player restarted");
            return Effect::Applied;
        }
        ClientMsg::Unknown => {}
    }

    Effect::Ignored
}
