use super::animation::Animation;
use super::config::WorldConfig;
use super::geometry::{IVec2, Rect, Vec2};
use super::physics::{Collisions, Gravity, PhysicsBody};
use super::render::DrawCommand;
use super::tilemap::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
}

impl EntityKind {
    pub const fn as_token(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
        }
    }
}

/// Player actions in ascending priority: jump beats run beats idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Idle,
    Run,
    Jump,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 3] = [PlayerAction::Idle, PlayerAction::Run, PlayerAction::Jump];

    pub const fn as_token(self) -> &'static str {
        match self {
            PlayerAction::Idle => "idle",
            PlayerAction::Run => "run",
            PlayerAction::Jump => "jump",
        }
    }
}

/// Animation templates for every player action. Built once by the asset
/// layer, so an action can never be missing at switch time.
#[derive(Debug, Clone)]
pub struct PlayerAnimations {
    pub idle: Animation,
    pub run: Animation,
    pub jump: Animation,
}

impl PlayerAnimations {
    pub fn get(&self, action: PlayerAction) -> &Animation {
        match action {
            PlayerAction::Idle => &self.idle,
            PlayerAction::Run => &self.run,
            PlayerAction::Jump => &self.jump,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    body: PhysicsBody,
    air_time: u32,
    jumps: u32,
    max_jumps: u32,
    jump_speed: f32,
    airborne_threshold: u32,
    action: PlayerAction,
    flip: bool,
    templates: PlayerAnimations,
    animation: Animation,
    render_padding: IVec2,
}

impl Player {
    pub fn new(config: &WorldConfig, templates: PlayerAnimations) -> Self {
        let animation = templates.idle.reset_copy();
        Self {
            body: PhysicsBody::new(
                config.player_spawn,
                config.player_size,
                Gravity::from_config(config),
            ),
            air_time: 0,
            jumps: config.max_jumps,
            max_jumps: config.max_jumps,
            jump_speed: config.jump_speed,
            airborne_threshold: config.airborne_threshold_ticks,
            action: PlayerAction::Idle,
            flip: false,
            templates,
            animation,
            render_padding: config.player_render_padding,
        }
    }

    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn collisions(&self) -> Collisions {
        self.body.collisions()
    }

    pub fn action(&self) -> PlayerAction {
        self.action
    }

    pub fn air_time(&self) -> u32 {
        self.air_time
    }

    pub fn jumps_left(&self) -> u32 {
        self.jumps
    }

    pub fn is_flipped(&self) -> bool {
        self.flip
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Advances one tick with horizontal intent in `-1.0..=1.0`.
    pub fn update(&mut self, intent_x: f32, grid: &TileGrid) {
        self.body.update(Vec2::new(intent_x, 0.0), grid);

        if intent_x > 0.0 {
            self.flip = false;
        }
        if intent_x < 0.0 {
            self.flip = true;
        }
        self.animation.advance();

        self.air_time = self.air_time.saturating_add(1);
        if self.body.collisions().down {
            self.air_time = 0;
            self.jumps = self.max_jumps;
        }

        let next = if self.air_time > self.airborne_threshold {
            PlayerAction::Jump
        } else if intent_x != 0.0 {
            PlayerAction::Run
        } else {
            PlayerAction::Idle
        };
        self.set_action(next);
    }

    /// Upward impulse. Consumes one jump; returns false when none are left.
    pub fn jump(&mut self) -> bool {
        if self.jumps == 0 {
            return false;
        }
        self.body.velocity.y = self.jump_speed;
        self.jumps -= 1;
        // Show the jump pose right away instead of waiting out the threshold.
        self.air_time = self.airborne_threshold + 1;
        true
    }

    fn set_action(&mut self, action: PlayerAction) {
        if action == self.action {
            return;
        }
        self.action = action;
        self.animation = self.templates.get(action).reset_copy();
    }

    pub fn draw_command(&self, camera_offset: IVec2) -> DrawCommand {
        let position = self.body.position - camera_offset.as_vec2() + self.render_padding.as_vec2();
        DrawCommand::new(self.animation.current_image(), position.floored()).flipped(self.flip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::GridCoord;
    use crate::world::render::ImageHandle;
    use crate::world::tilemap::Tile;

    fn animation(first_id: u32, count: u32, duration: u32) -> Animation {
        let images: Vec<ImageHandle> = (first_id..first_id + count)
            .map(|id| ImageHandle {
                id,
                width: 14,
                height: 18,
            })
            .collect();
        Animation::new(images, duration, true)
    }

    fn templates() -> PlayerAnimations {
        PlayerAnimations {
            idle: animation(0, 2, 6),
            run: animation(10, 4, 4),
            jump: animation(20, 1, 5),
        }
    }

    fn floor_grid() -> TileGrid {
        let mut grid = TileGrid::from_config(&WorldConfig::default());
        for x in -5..=5 {
            grid.set(Tile::new("grass", 0, GridCoord::new(x, 10)));
        }
        grid
    }

    fn grounded_player() -> Player {
        let config = WorldConfig {
            player_spawn: Vec2::new(4.0, 145.0),
            ..WorldConfig::default()
        };
        let mut player = Player::new(&config, templates());
        player.update(0.0, &floor_grid());
        player.update(0.0, &floor_grid());
        player
    }

    #[test]
    fn starts_idle_with_full_jumps() {
        let player = Player::new(&WorldConfig::default(), templates());
        assert_eq!(player.action(), PlayerAction::Idle);
        assert_eq!(player.jumps_left(), 1);
        assert_eq!(player.position(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn horizontal_intent_on_ground_runs() {
        let grid = floor_grid();
        let mut player = grounded_player();

        player.update(1.0, &grid);

        assert_eq!(player.action(), PlayerAction::Run);
        assert_eq!(player.animation().images()[0].id, 10);
    }

    #[test]
    fn falling_longer_than_threshold_switches_to_jump() {
        let grid = TileGrid::from_config(&WorldConfig::default());
        let mut player = Player::new(&WorldConfig::default(), templates());

        for _ in 0..4 {
            player.update(1.0, &grid);
            assert_ne!(player.action(), PlayerAction::Jump);
        }
        player.update(1.0, &grid);

        assert_eq!(player.air_time(), 5);
        assert_eq!(player.action(), PlayerAction::Jump);
    }

    #[test]
    fn landing_resets_air_time_and_jumps() {
        let grid = floor_grid();
        let mut player = grounded_player();
        assert!(player.jump());
        assert_eq!(player.jumps_left(), 0);
        assert!(!player.jump());

        let mut landed = false;
        for _ in 0..200 {
            player.update(0.0, &grid);
            if player.collisions().down {
                landed = true;
                break;
            }
        }

        assert!(landed);
        assert_eq!(player.air_time(), 0);
        assert_eq!(player.jumps_left(), 1);
        assert_eq!(player.action(), PlayerAction::Idle);
    }

    #[test]
    fn jump_sets_fixed_upward_velocity() {
        let mut player = grounded_player();
        assert!(player.jump());
        assert_eq!(player.velocity().y, WorldConfig::default().jump_speed);
        assert_eq!(
            player.air_time(),
            WorldConfig::default().airborne_threshold_ticks + 1
        );
    }

    #[test]
    fn facing_is_kept_while_idle() {
        let grid = floor_grid();
        let mut player = grounded_player();

        player.update(-1.0, &grid);
        assert!(player.is_flipped());
        player.update(0.0, &grid);
        assert!(player.is_flipped());
        player.update(1.0, &grid);
        assert!(!player.is_flipped());
    }

    #[test]
    fn repeating_same_action_keeps_frame_progress() {
        let grid = floor_grid();
        let mut player = grounded_player();
        player.update(1.0, &grid);
        player.update(1.0, &grid);
        player.update(1.0, &grid);

        assert_eq!(player.action(), PlayerAction::Run);
        assert_eq!(player.animation().frame(), 2);
    }

    #[test]
    fn reentering_action_restarts_animation() {
        let grid = floor_grid();
        let mut player = grounded_player();
        for _ in 0..3 {
            player.update(1.0, &grid);
        }
        player.update(0.0, &grid);
        for _ in 0..3 {
            player.update(1.0, &grid);
        }

        assert_eq!(player.action(), PlayerAction::Run);
        assert_eq!(player.animation().frame(), 2);
    }

    #[test]
    fn draw_command_applies_offset_padding_and_flip() {
        let grid = floor_grid();
        let mut player = grounded_player();
        player.update(-1.0, &grid);

        let command = player.draw_command(IVec2::new(-10, 20));

        assert!(command.flip_x);
        assert_eq!(command.position, IVec2::new(3 - 3 + 10, 145 - 3 - 20));
    }
}
