use std::collections::HashSet;

use super::geometry::{IVec2, Vec2};

pub const DEFAULT_TILE_SIZE: u32 = 16;
pub const GRAVITY_PER_TICK: f32 = 0.1;
pub const TERMINAL_VELOCITY: f32 = 5.0;
pub const JUMP_SPEED: f32 = -3.0;
pub const AIRBORNE_THRESHOLD_TICKS: u32 = 4;
pub const CAMERA_SMOOTHING_STEPS: f32 = 30.0;
pub const DEFAULT_SOLID_TILE_TYPES: [&str; 2] = ["grass", "stone"];

/// Tunables shared by the tile grid, the physics body, the player and the camera.
///
/// Passed explicitly into every constructor that needs it; there is no global
/// game object to reach into.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub tile_size: u32,
    pub gravity_per_tick: f32,
    pub terminal_velocity: f32,
    pub jump_speed: f32,
    pub airborne_threshold_ticks: u32,
    pub max_jumps: u32,
    pub camera_smoothing_steps: f32,
    pub solid_tile_types: HashSet<String>,
    pub player_size: IVec2,
    pub player_spawn: Vec2,
    /// Sprite-space offset applied when drawing the player, since the sprite is
    /// larger than its collision box.
    pub player_render_padding: IVec2,
    pub cloud_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            gravity_per_tick: GRAVITY_PER_TICK,
            terminal_velocity: TERMINAL_VELOCITY,
            jump_speed: JUMP_SPEED,
            airborne_threshold_ticks: AIRBORNE_THRESHOLD_TICKS,
            max_jumps: 1,
            camera_smoothing_steps: CAMERA_SMOOTHING_STEPS,
            solid_tile_types: DEFAULT_SOLID_TILE_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
            player_size: IVec2::new(8, 15),
            player_spawn: Vec2::new(50.0, 50.0),
            player_render_padding: IVec2::new(-3, -3),
            cloud_count: 16,
        }
    }
}
