//! Player lifecycle: connect and disconnect

use std::sync::Arc;
use tracing::info;

use crate::config::GameConfig;
use crate::ws::protocol::ServerMsg;

use super::world::{Outbox, Player, PlayerId, SharedWorld};

/// Adds and removes players from the shared world
#[derive(Clone)]
pub struct SessionManager {
    world: SharedWorld,
    config: Arc<GameConfig>,
}

impl SessionManager {
    pub fn new(world: SharedWorld, config: Arc<GameConfig>) -> Self {
        Self { world, config }
    }

    /// Register a new session. `init` is queued before the player becomes
    /// visible to the broadcaster, so it is always the first message.
    pub fn connect(&self, outbox: Outbox) -> PlayerId {
        let mut world = self.world.lock();
        let id = world.allocate_id();
        let player = Player::spawn(id, outbox, &self.config);

        // A dead outbox here is caught by the next broadcast
        let _ = player.send(ServerMsg::Init { id });
        world.players.insert(id, player);

        info!(player_id = id, players = world.players.len(), "Player connected");
        id
    }

    /// Remove a session. Safe to call more than once.
    pub fn disconnect(&self, id: PlayerId) -> bool {
        let mut world = self.world.lock();
        let removed = world.players.remove(&id).is_some();
        if removed {
            info!(player_id = id, players = world.players.len(), "Player disconnected");
        }
        removed
    }

    pub fn player_count(&self) -> usize {
        self.world.lock().players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::WorldState;
    use tokio::sync::mpsc;

    fn manager() -> (SessionManager, SharedWorld) {
        let world = WorldState::new().into_shared();
        let sessions = SessionManager::new(world.clone(), Arc::new(GameConfig::default()));
        (sessions, world)
    }

    #[test]
    fn connect_assigns_sequential_ids_and_sends_init() {
        let (sessions, world) = manager();
        let (tx1, mut rx1) = mpsc::channel(64);
        let (tx2, mut rx2) = mpsc::channel(64);

        assert_eq!(sessions.connect(tx1), 1);
        assert_eq!(sessions.connect(tx2), 2);

        assert_eq!(rx1.try_recv().unwrap(), ServerMsg::Init { id: 1 });
        assert_eq!(rx2.try_recv().unwrap(), ServerMsg::Init { id: 2 });

        let w = world.lock();
        let p = &w.players[&2];
        assert_eq!((p.position_x, p.position_y, p.velocity_y), (500.0, 0.0, 15.0));
        assert!(p.alive && p.dash.is_ready() && p.obstacle_push.is_ready());
    }

    #[test]
    fn disconnect_is_idempotent_and_closes_outbox() {
        let (sessions, _world) = manager();
        let (tx, mut rx) = mpsc::channel(64);
        let id = sessions.connect(tx);
        rx.try_recv().unwrap();

        assert!(sessions.disconnect(id));
        assert!(!sessions.disconnect(id));
        assert!(!sessions.disconnect(99));
        assert_eq!(sessions.player_count(), 0);

        assert_eq!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn ids_are_not_reused_after_disconnect() {
        let (sessions, _world) = manager();
        let (tx1, _rx1) = mpsc::channel(64);
        let (tx2, _rx2) = mpsc::channel(64);

        let first = sessions.connect(tx1);
        sessions.disconnect(first);
        assert_eq!(sessions.connect(tx2), first + 1);
    }
}
