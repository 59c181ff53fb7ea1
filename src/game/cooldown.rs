//! Cooldown timers for dash and obstacle push

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::world::{PlayerId, SharedWorld};

/// Cooldown-limited actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Dash,
    ObstaclePush,
}

/// Readiness flag plus the epoch of the timer allowed to re-arm it.
///
/// Every trigger and every reset starts a new epoch, so a timer only
/// re-arms the flag it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    ready: bool,
    epoch: u64,
}

impl Cooldown {
    pub fn ready() -> Self {
        Self {
            ready: true,
            epoch: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Consume readiness. Returns the epoch the reset timer must carry,
    /// or `None` when still cooling down.
    pub fn trigger(&mut self) -> Option<u64> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        self.epoch += 1;
        Some(self.epoch)
    }

    /// Timer expiry. Returns false for a stale timer.
    pub fn rearm(&mut self, epoch: u64) -> bool {
        if self.ready || self.epoch != epoch {
            return false;
        }
        self.ready = true;
        true
    }

    /// Make ready now and invalidate any outstanding timer
    pub fn reset(&mut self) {
        self.ready = true;
        self.epoch += 1;
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::ready()
    }
}

/// Spawns one-shot reset timers keyed by (player, action)
#[derive(Clone)]
pub struct CooldownScheduler {
    world: SharedWorld,
    duration: Duration,
}

impl CooldownScheduler {
    pub fn new(world: SharedWorld, duration: Duration) -> Self {
        Self { world, duration }
    }

    /// Re-arm `action` for `player_id` after the cooldown, if `epoch` is still current
    pub fn schedule(&self, player_id: PlayerId, action: Action, epoch: u64) -> JoinHandle<()> {
        let world = self.world.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            expire(&world, player_id, action, epoch);
        })
    }
}

fn expire(world: &SharedWorld, player_id: PlayerId, action: Action, epoch: u64) {
    let mut world = world.lock();
    match world.players.get_mut(&player_id) {
        Some(player) => {
            if player.cooldown_mut(action).rearm(epoch) {
                debug!(player_id, ?action, "Cooldown ready");
            } else {
                debug!(player_id, ?action, epoch, "Stale cooldown timer ignored");
            }
        }
        None => {
            debug!(player_id, ?action, "Cooldown expired for departed player");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::world::{Player, WorldState};
    use tokio::sync::mpsc;
    use tokio::time::{sleep, Instant};

    const COOLDOWN: Duration = Duration::from_secs(10);

    fn world_with_player() -> (SharedWorld, mpsc::Receiver<crate::ws::protocol::ServerMsg>) {
        let (tx, rx) = mpsc::channel(64);
        let mut world = WorldState::new();
        let id = world.allocate_id();
        world
            .players
            .insert(id, Player::spawn(id, tx, &GameConfig::default()));
        (world.into_shared(), rx)
    }

    #[test]
    fn trigger_only_when_ready() {
        let mut cd = Cooldown::ready();
        assert_eq!(cd.trigger(), Some(1));
        assert!(!cd.is_ready());
        assert_eq!(cd.trigger(), None);
        assert!(cd.rearm(1));
        assert!(cd.is_ready());
    }

    #[test]
    fn stale_epoch_does_not_rearm() {
        let mut cd = Cooldown::ready();
        let old = cd.trigger().unwrap();
        cd.reset();
        let current = cd.trigger().unwrap();

        assert!(!cd.rearm(old));
        assert!(!cd.is_ready());
        assert!(cd.rearm(current));
    }

    #[tokio::test(start_paused = true)]
    async fn flag_returns_after_full_cooldown() {
        let (world, _rx) = world_with_player();
        let scheduler = CooldownScheduler::new(world.clone(), COOLDOWN);

        let epoch = world.lock().players.get_mut(&1).unwrap().dash.trigger().unwrap();
        let start = Instant::now();
        let handle = scheduler.schedule(1, Action::Dash, epoch);

        sleep(COOLDOWN - Duration::from_millis(1)).await;
        assert!(!world.lock().players[&1].dash.is_ready());

        handle.await.unwrap();
        assert!(start.elapsed() >= COOLDOWN);
        assert!(world.lock().players[&1].dash.is_ready());
        assert!(world.lock().players[&1].obstacle_push.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn dead_player_still_recovers() {
        let (world, _rx) = world_with_player();
        let scheduler = CooldownScheduler::new(world.clone(), COOLDOWN);
        let epoch = {
            let mut w = world.lock();
            let player = w.players.get_mut(&1).unwrap();
            player.alive = false;
            player.obstacle_push.trigger().unwrap()
        };

        scheduler.schedule(1, Action::ObstaclePush, epoch).await.unwrap();

        let w = world.lock();
        assert!(!w.players[&1].alive);
        assert!(w.players[&1].obstacle_push.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn departed_player_is_tolerated() {
        let (world, _rx) = world_with_player();
        let scheduler = CooldownScheduler::new(world.clone(), COOLDOWN);
        let epoch = world.lock().players.get_mut(&1).unwrap().dash.trigger().unwrap();
        world.lock().players.remove(&1);

        let result = scheduler.schedule(1, Action::Dash, epoch).await;

        assert!(result.is_ok());
        assert!(world.lock().players.is_empty());
    }
}
