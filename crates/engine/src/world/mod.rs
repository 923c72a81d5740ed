//! Engine-agnostic platformer core: tile grid, physics, animation, player,
//! camera and clouds. Nothing here touches a window or decoded pixels; frames
//! are described as [`RenderList`]s of [`ImageHandle`]s.

mod animation;
mod camera;
mod clouds;
mod config;
mod geometry;
mod physics;
mod player;
mod render;
mod tilemap;

pub use animation::Animation;
pub use camera::Camera;
pub use clouds::{Cloud, Clouds};
pub use config::{
    WorldConfig, AIRBORNE_THRESHOLD_TICKS, CAMERA_SMOOTHING_STEPS, DEFAULT_SOLID_TILE_TYPES,
    DEFAULT_TILE_SIZE, GRAVITY_PER_TICK, JUMP_SPEED, TERMINAL_VELOCITY,
};
pub use geometry::{GridCoord, IVec2, Rect, Vec2};
pub use physics::{Collisions, Gravity, PhysicsBody};
pub use player::{EntityKind, Player, PlayerAction, PlayerAnimations};
pub use render::{DrawCommand, ImageHandle, RenderList, OPAQUE};
pub use tilemap::{
    CoordKey, CoordKeyError, OffgridTile, Tile, TileGrid, VisibleTileRange, NEIGHBOR_OFFSETS,
};
