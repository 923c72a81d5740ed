use super::config::WorldConfig;
use super::geometry::{IVec2, Rect, Vec2};
use super::tilemap::TileGrid;

/// Which sides touched a solid tile during the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub per_tick: f32,
    pub terminal_velocity: f32,
}

impl Gravity {
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            per_tick: config.gravity_per_tick,
            terminal_velocity: config.terminal_velocity,
        }
    }
}

/// Axis-aligned body integrated against a [`TileGrid`].
///
/// `position` is the top-left corner and keeps its fractional part between
/// ticks. Only the vertical velocity accumulates; horizontal motion comes
/// entirely from the per-tick intent.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub position: Vec2,
    pub velocity: Vec2,
    size: IVec2,
    collisions: Collisions,
    gravity: Gravity,
}

impl PhysicsBody {
    pub fn new(position: Vec2, size: IVec2, gravity: Gravity) -> Self {
        assert!(
            size.x > 0 && size.y > 0,
            "physics body size must be positive, got {size:?}"
        );
        assert!(
            position.is_finite(),
            "physics body position must be finite, got {position:?}"
        );
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            collisions: Collisions::default(),
            gravity,
        }
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn collisions(&self) -> Collisions {
        self.collisions
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.x as f32,
            self.size.y as f32,
        )
    }

    /// Moves by `intent + velocity`, resolving the X axis fully before the Y
    /// axis, then applies gravity.
    ///
    /// Resolving axes separately lets a body moving diagonally catch a ledge
    /// corner it would clip with simultaneous resolution; platforming feel
    /// depends on that, so it stays.
    pub fn update(&mut self, intent: Vec2, grid: &TileGrid) {
        assert!(
            intent.is_finite() && self.position.is_finite() && self.velocity.is_finite(),
            "non-finite physics state: position={:?} velocity={:?} intent={intent:?}",
            self.position,
            self.velocity
        );
        let tile_size = grid.tile_size();
        assert!(
            self.size.x as u32 <= tile_size && self.size.y as u32 <= tile_size,
            "physics body {:?} is larger than one {tile_size}px tile",
            self.size
        );
        self.collisions = Collisions::default();
        let frame_movement = intent + self.velocity;

        self.position.x += frame_movement.x;
        let mut body = self.rect();
        for tile in grid.physics_rects(self.position) {
            if !body.overlaps(&tile) {
                continue;
            }
            if frame_movement.x > 0.0 {
                body.set_right(tile.left());
                self.collisions.right = true;
            }
            if frame_movement.x < 0.0 {
                body.set_left(tile.right());
                self.collisions.left = true;
            }
            self.position.x = body.x;
        }

        self.position.y += frame_movement.y;
        let mut body = self.rect();
        for tile in grid.physics_rects(self.position) {
            if !body.overlaps(&tile) {
                continue;
            }
            if frame_movement.y > 0.0 {
                body.set_bottom(tile.top());
                self.collisions.down = true;
            }
            if frame_movement.y < 0.0 {
                body.set_top(tile.bottom());
                self.collisions.up = true;
            }
            self.position.y = body.y;
        }

        self.velocity.y =
            (self.velocity.y + self.gravity.per_tick).min(self.gravity.terminal_velocity);
        if self.collisions.down || self.collisions.up {
            self.velocity.y = 0.0;
        }
    }
}
