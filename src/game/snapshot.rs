//! Snapshot building and broadcast

use tracing::warn;

use crate::ws::protocol::{ObstacleSnapshot, PlayerSnapshot, ServerMsg};

use super::world::{PlayerId, WorldState};

/// Build a full `state` message from the current world
pub fn build_snapshot(world: &WorldState) -> ServerMsg {
    let players = world
        .players
        .values()
        .map(|p| PlayerSnapshot {
            id: p.id,
            position_x: p.position_x,
            position_y: p.position_y,
            alive: p.alive,
        })
        .collect();

    let obstacles = world
        .obstacles
        .iter()
        .map(|o| ObstacleSnapshot {
            position_x: o.position_x,
        })
        .collect();

    ServerMsg::State { players, obstacles }
}

/// Send the same snapshot to every session.
///
/// A session whose outbox is closed, or still full from earlier ticks, is
/// removed on the spot; the removed ids are returned.
pub fn broadcast(world: &mut WorldState) -> Vec<PlayerId> {
    let snapshot = build_snapshot(world);

    let failed: Vec<PlayerId> = world
        .players
        .values()
        .filter(|p| !p.send(snapshot.clone()))
        .map(|p| p.id)
        .collect();

    for id in &failed {
        world.players.remove(id);
        warn!(player_id = *id, "Snapshot send failed, dropping session");
    }

    failed
}
