//! Vertical integration, obstacle hits and obstacle scrolling

use super::world::Obstacle;

/// Physics system for updating players and obstacles
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Integrate one tick of vertical motion.
    /// Returns (new_y, new_vel_y); landing zeroes both.
    pub fn integrate_vertical(y: f64, vel_y: f64, gravity: f64) -> (f64, f64) {
        let new_y = y + vel_y;
        let new_vel_y = vel_y - gravity;

        if new_y < 0.0 {
            (0.0, 0.0)
        } else {
            (new_y, new_vel_y)
        }
    }

    /// Check if an obstacle's leading edge is inside the player's hitbox
    /// while the player is low enough to be hit
    pub fn check_obstacle_hit(
        player_x: f64,
        player_y: f64,
        obstacle_x: f64,
        hitbox_width: f64,
        hit_height: f64,
    ) -> bool {
        obstacle_x >= player_x && obstacle_x <= player_x + hitbox_width && player_y <= hit_height
    }

    /// Scroll obstacles left by `speed`, dropping any past `despawn_x`.
    /// Order of survivors is preserved.
    pub fn advance_obstacles(obstacles: &[Obstacle], speed: f64, despawn_x: f64) -> Vec<Obstacle> {
        obstacles
            .iter()
            .map(|o| Obstacle {
                position_x: o.position_x - speed,
            })
            .filter(|o| o.position_x >= despawn_x)
            .collect()
    }
}
