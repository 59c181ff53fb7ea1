//! Authoritative tick loop and obstacle spawning

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::ws::protocol::ServerMsg;

use super::physics::PhysicsSystem;
use super::snapshot;
use super::world::{PlayerId, SharedWorld, WorldState};

/// What happened during one tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Players that hit an obstacle this tick
    pub knocked_out: Vec<PlayerId>,
    /// Obstacles that scrolled off the lane
    pub pruned: usize,
    /// Sessions dropped because the snapshot could not be delivered
    pub dropped: Vec<PlayerId>,
}

/// Advance the world by one tick: physics, collisions, obstacle scroll.
/// Does not broadcast.
pub fn step(world: &mut WorldState, config: &GameConfig) -> TickReport {
    let mut report = TickReport::default();

    for player in world.players.values_mut() {
        if !player.alive {
            continue;
        }
        let (y, vel_y) =
            PhysicsSystem::integrate_vertical(player.position_y, player.velocity_y, config.gravity);
        player.position_y = y;
        player.velocity_y = vel_y;
    }

    for player in world.players.values_mut() {
        if !player.alive {
            continue;
        }
        let hit = world.obstacles.iter().any(|o| {
            PhysicsSystem::check_obstacle_hit(
                player.position_x,
                player.position_y,
                o.position_x,
                config.hitbox_width,
                config.hit_height,
            )
        });
        if hit {
            player.alive = false;
            let _ = player.send(ServerMsg::Gameover);
            report.knocked_out.push(player.id);
        }
    }

    let before = world.obstacles.len();
    world.obstacles = PhysicsSystem::advance_obstacles(
        &world.obstacles,
        config.obstacle_speed,
        config.obstacle_despawn_x,
    );
    report.pruned = before - world.obstacles.len();

    report
}

/// Owns the tick cadence and the obstacle spawn timer
pub struct Simulation {
    world: SharedWorld,
    config: Arc<GameConfig>,
    rng: ChaCha8Rng,
}

impl Simulation {
    pub fn new(world: SharedWorld, config: Arc<GameConfig>) -> Self {
        let rng = match config.obstacle_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { world, config, rng }
    }

    /// Uniform draw from the configured spawn interval range
    pub fn next_spawn_interval(&mut self) -> Duration {
        let min = self.config.spawn_interval_min.as_millis() as u64;
        let max = self.config.spawn_interval_max.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(self.rng.gen_range(min..max))
    }

    /// One full tick: simulate and broadcast inside one critical section,
    /// so every client sees the same post-tick state
    pub fn tick(&self) -> TickReport {
        let mut world = self.world.lock();
        let mut report = step(&mut world, &self.config);
        report.dropped = snapshot::broadcast(&mut world);

        for id in &report.knocked_out {
            info!(player_id = *id, "Player hit an obstacle");
        }
        if report.pruned > 0 || !report.dropped.is_empty() {
            debug!(
                pruned = report.pruned,
                dropped = report.dropped.len(),
                players = world.players.len(),
                "Tick removed entities"
            );
        }
        report
    }

    pub fn spawn_obstacle(&self) {
        let mut world = self.world.lock();
        world.spawn_obstacle(self.config.obstacle_spawn_x);
        debug!(obstacles = world.obstacles.len(), "Obstacle spawned");
    }

    /// Run until the process exits
    pub async fn run(mut self) {
        info!(
            tick_ms = self.config.tick_period.as_millis() as u64,
            "Simulation started"
        );

        let mut ticker = interval(self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let spawn_timer = sleep(self.next_spawn_interval());
        tokio::pin!(spawn_timer);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let started = Instant::now();
                    self.tick();
                    let elapsed = started.elapsed();
                    if elapsed > self.config.tick_period {
                        debug!(elapsed_micros = elapsed.as_micros() as u64, "Tick overran its period");
                    }
                }
                _ = &mut spawn_timer => {
                    self.spawn_obstacle();
                    let next = self.next_spawn_interval();
                    spawn_timer.as_mut().reset(Instant::now() + next);
                }
            }
        }
    }
}
