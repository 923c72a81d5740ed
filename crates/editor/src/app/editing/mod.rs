use std::path::PathBuf;

use engine::world::{
    Camera, DrawCommand, GridCoord, IVec2, ImageHandle, OffgridTile, Rect, RenderList, Tile,
    TileGrid, Vec2, WorldConfig,
};
use engine::{save_level, AssetLibrary, InputAction, InputSnapshot, Scene, SceneCommand};
use tracing::{debug, info, warn};

const PAN_SPEED: f32 = 2.0;
const PREVIEW_ALPHA: u8 = 100;
const CURRENT_TILE_POSITION: IVec2 = IVec2::new(5, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlacementMode {
    OnGrid,
    OffGrid,
}

impl PlacementMode {
    fn toggled(self) -> Self {
        match self {
            Self::OnGrid => Self::OffGrid,
            Self::OffGrid => Self::OnGrid,
        }
    }

    fn as_token(self) -> &'static str {
        match self {
            Self::OnGrid => "on_grid",
            Self::OffGrid => "off_grid",
        }
    }
}

/// Paints tiles from the asset palette onto the level and saves it back to
/// `level_path`.
pub(crate) struct EditorScene {
    display: (u32, u32),
    assets: AssetLibrary,
    grid: TileGrid,
    level_path: PathBuf,
    camera: Camera,
    group: usize,
    variant: usize,
    mode: PlacementMode,
    cursor_px: Option<Vec2>,
}

impl EditorScene {
    pub(crate) fn new(
        config: &WorldConfig,
        display: (u32, u32),
        assets: AssetLibrary,
        grid: TileGrid,
        level_path: PathBuf,
    ) -> Self {
        Self {
            display,
            assets,
            grid,
            level_path,
            camera: Camera::new(config.camera_smoothing_steps),
            group: 0,
            variant: 0,
            mode: PlacementMode::OnGrid,
            cursor_px: None,
        }
    }

    fn group_name(&self) -> Option<&str> {
        self.assets
            .tile_groups()
            .get(self.group)
            .map(|group| group.name.as_str())
    }

    fn current_image(&self) -> Option<ImageHandle> {
        self.assets
            .tile_groups()
            .get(self.group)?
            .variants
            .get(self.variant)
            .copied()
    }

    fn cursor_world(&self) -> Option<Vec2> {
        self.cursor_px.map(|cursor| cursor + self.camera.scroll())
    }

    /// Positive steps (wheel up) move backwards through the palette. Without
    /// shift the group changes and the variant restarts at 0.
    fn cycle_palette(&mut self, steps: i32, shift: bool) {
        if steps == 0 {
            return;
        }
        let groups = self.assets.tile_groups();
        if shift {
            let Some(group) = groups.get(self.group) else {
                return;
            };
            self.variant = wrap_index(self.variant, -steps, group.variants.len());
        } else {
            self.group = wrap_index(self.group, -steps, groups.len());
            self.variant = 0;
        }
        debug!(
            group = self.group_name().unwrap_or("none"),
            variant = self.variant,
            "palette_changed"
        );
    }

    fn place_on_grid(&mut self, world: Vec2) {
        let Some(name) = self.group_name() else {
            return;
        };
        let coord = GridCoord::from_pixel(world, self.grid.tile_size());
        let tile = Tile::new(name, self.variant as u32, coord);
        self.grid.set(tile);
    }

    fn place_off_grid(&mut self, world: Vec2) {
        let Some(name) = self.group_name() else {
            return;
        };
        let tile = OffgridTile {
            tile_type: name.to_string(),
            variant: self.variant as u32,
            pixel_position: world,
        };
        self.grid.push_offgrid(tile);
    }

    fn erase_at(&mut self, world: Vec2) {
        let coord = GridCoord::from_pixel(world, self.grid.tile_size());
        self.grid.remove(coord);
        let assets = &self.assets;
        self.grid.remove_offgrid_where(|tile| {
            assets
                .tile_image(&tile.tile_type, tile.variant)
                .map(|image| {
                    Rect::new(
                        tile.pixel_position.x,
                        tile.pixel_position.y,
                        image.width as f32,
                        image.height as f32,
                    )
                    .contains_point(world)
                })
                .unwrap_or(false)
        });
    }

    fn save(&self) {
        if let Err(err) = save_level(&self.level_path, &self.grid) {
            warn!(error = %err, "level_save_failed");
        }
    }
}

impl Scene for EditorScene {
    fn load(&mut self) {
        info!(
            path = %self.level_path.display(),
            tiles = self.grid.len(),
            offgrid = self.grid.offgrid_tiles().len(),
            groups = self.assets.tile_groups().len(),
            "editor_scene_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        let axis = |positive: InputAction, negative: InputAction| {
            (input.is_down(positive) as i32 - input.is_down(negative) as i32) as f32 * PAN_SPEED
        };
        self.camera.pan(Vec2::new(
            axis(InputAction::MoveRight, InputAction::MoveLeft),
            axis(InputAction::MoveDown, InputAction::MoveUp),
        ));
        self.cursor_px = input.cursor_position_px();

        self.cycle_palette(input.wheel_steps(), input.is_down(InputAction::Shift));
        if input.grid_toggle_pressed() {
            self.mode = self.mode.toggled();
            info!(mode = self.mode.as_token(), "placement_mode_changed");
        }

        if let Some(world) = self.cursor_world() {
            match self.mode {
                PlacementMode::OnGrid if input.left_mouse_down() => self.place_on_grid(world),
                PlacementMode::OffGrid if input.left_click_pressed() => self.place_off_grid(world),
                _ => {}
            }
            if input.right_mouse_down() {
                self.erase_at(world);
            }
        }

        if input.save_pressed() {
            self.save();
        }
        SceneCommand::None
    }

    fn render(&mut self, out: &mut RenderList) {
        let offset = self.camera.render_offset();
        let assets = &self.assets;
        self.grid.draw(
            self.display,
            offset,
            |tile_type, variant| assets.tile_image(tile_type, variant),
            out,
        );

        let Some(image) = self.current_image() else {
            return;
        };
        if let (Some(cursor), Some(world)) = (self.cursor_px, self.cursor_world()) {
            let position = match self.mode {
                PlacementMode::OnGrid => {
                    let cell = GridCoord::from_pixel(world, self.grid.tile_size())
                        .to_pixel(self.grid.tile_size());
                    IVec2::new(cell.x - offset.x, cell.y - offset.y)
                }
                PlacementMode::OffGrid => cursor.floored(),
            };
            out.push(DrawCommand::new(image, position).with_alpha(PREVIEW_ALPHA));
        }
        out.push(DrawCommand::new(image, CURRENT_TILE_POSITION).with_alpha(PREVIEW_ALPHA));
    }

    fn debug_title(&self) -> Option<String> {
        let hovered_solid = self
            .cursor_world()
            .and_then(|world| self.grid.solid_tile_at(world))
            .is_some();
        Some(format!(
            "ninja game level editor | {} #{} | {}{}",
            self.group_name().unwrap_or("-"),
            self.variant,
            self.mode.as_token(),
            if hovered_solid { " | solid" } else { "" }
        ))
    }
}

fn wrap_index(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as i64 + delta as i64).rem_euclid(len as i64) as usize
}
