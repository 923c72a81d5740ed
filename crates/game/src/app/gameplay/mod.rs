use engine::world::{Camera, Clouds, DrawCommand, IVec2, Player, RenderList, TileGrid, WorldConfig};
use engine::{AssetLibrary, InputSnapshot, Scene, SceneCommand};
use tracing::{debug, info};

/// The platformer: one player, a tile level, parallax clouds and a
/// following camera.
pub(crate) struct GameScene {
    config: WorldConfig,
    display: (u32, u32),
    assets: AssetLibrary,
    grid: TileGrid,
    clouds: Clouds,
    player: Player,
    camera: Camera,
    tick: u64,
}

impl GameScene {
    pub(crate) fn new(
        config: WorldConfig,
        display: (u32, u32),
        assets: AssetLibrary,
        grid: TileGrid,
        clouds: Clouds,
    ) -> Self {
        let player = Player::new(&config, assets.player_animations().clone());
        let camera = Camera::new(config.camera_smoothing_steps);
        Self {
            config,
            display,
            assets,
            grid,
            clouds,
            player,
            camera,
            tick: 0,
        }
    }
}

impl Scene for GameScene {
    fn load(&mut self) {
        self.player = Player::new(&self.config, self.assets.player_animations().clone());
        self.camera = Camera::new(self.config.camera_smoothing_steps);
        self.tick = 0;
        info!(
            tiles = self.grid.len(),
            offgrid = self.grid.offgrid_tiles().len(),
            clouds = self.clouds.len(),
            "game_scene_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        self.clouds.update();
        if input.jump_pressed() && self.player.jump() {
            debug!(tick = self.tick, "player_jumped");
        }
        let previous_action = self.player.action();
        self.player.update(input.horizontal_intent(), &self.grid);
        if self.player.action() != previous_action {
            debug!(
                tick = self.tick,
                action = self.player.action().as_token(),
                "player_action_changed"
            );
        }
        self.camera.update(self.player.rect().center(), self.display);
        self.tick += 1;
        SceneCommand::None
    }

    fn render(&mut self, out: &mut RenderList) {
        let offset = self.camera.render_offset();
        out.push(DrawCommand::new(self.assets.background(), IVec2::new(0, 0)));
        self.clouds.draw(offset, self.display, out);
        let assets = &self.assets;
        self.grid.draw(
            self.display,
            offset,
            |tile_type, variant| assets.tile_image(tile_type, variant),
            out,
        );
        out.push(self.player.draw_command(offset));
    }
}
