//! Sparse tile grid.
//!
//! Only placed tiles are stored, keyed by their [`GridCoord`]. Physics never
//! scans the whole map: it asks for the 3x3 cells around a pixel position, which
//! keeps collision cost constant regardless of level size as long as bodies are
//! no larger than one tile.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::config::WorldConfig;
use super::geometry::{GridCoord, IVec2, Rect, Vec2};
use super::render::{DrawCommand, ImageHandle, RenderList};

/// Center, then the four axis neighbors, then the diagonals.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (0, 0),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub tile_type: String,
    pub variant: u32,
    pub grid_position: GridCoord,
}

impl Tile {
    pub fn new(tile_type: impl Into<String>, variant: u32, grid_position: GridCoord) -> Self {
        Self {
            tile_type: tile_type.into(),
            variant,
            grid_position,
        }
    }
}

/// Decoration placed at an arbitrary pixel position; never collides.
#[derive(Debug, Clone, PartialEq)]
pub struct OffgridTile {
    pub tile_type: String,
    pub variant: u32,
    pub pixel_position: Vec2,
}

/// `"x;y"` key used by the persisted level format.
///
/// The semicolon cannot appear inside a signed decimal, so `"-1;2"` and
/// `"1;-2"` never collide the way comma or plain concatenation could.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey(pub GridCoord);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordKeyError {
    #[error("coordinate key '{key}' must contain exactly one ';'")]
    MissingSeparator { key: String },
    #[error("coordinate key '{key}' has a non-integer component '{component}'")]
    InvalidComponent { key: String, component: String },
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.0.x, self.0.y)
    }
}

impl FromStr for CoordKey {
    type Err = CoordKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split(';');
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CoordKeyError::MissingSeparator {
                key: key.to_string(),
            });
        };
        let parse = |component: &str| {
            component
                .parse::<i32>()
                .map_err(|_| CoordKeyError::InvalidComponent {
                    key: key.to_string(),
                    component: component.to_string(),
                })
        };
        Ok(CoordKey(GridCoord::new(parse(x)?, parse(y)?)))
    }
}

/// Inclusive range of grid cells overlapping a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleTileRange {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl VisibleTileRange {
    /// `offset / ts ..= (offset + dimension) / ts` per axis with floor division.
    /// The upper bound covers a partially visible tile at the far edge.
    pub fn for_viewport(viewport: (u32, u32), offset: IVec2, tile_size: u32) -> Self {
        let ts = tile_size as i32;
        Self {
            x_min: offset.x.div_euclid(ts),
            x_max: (offset.x + viewport.0 as i32).div_euclid(ts),
            y_min: offset.y.div_euclid(ts),
            y_max: (offset.y + viewport.1 as i32).div_euclid(ts),
        }
    }

    pub fn coords(self) -> impl Iterator<Item = GridCoord> {
        (self.x_min..=self.x_max)
            .flat_map(move |x| (self.y_min..=self.y_max).map(move |y| GridCoord::new(x, y)))
    }
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    tile_size: u32,
    solid_types: HashSet<String>,
    tiles: HashMap<GridCoord, Tile>,
    offgrid: Vec<OffgridTile>,
}

impl TileGrid {
    pub fn new(tile_size: u32, solid_types: HashSet<String>) -> Self {
        assert!(tile_size > 0, "tile size must be positive");
        Self {
            tile_size,
            solid_types,
            tiles: HashMap::new(),
            offgrid: Vec::new(),
        }
    }

    /// Grass floor along y=10 and a stone wall along x=10 crossing it.
    pub fn with_demo_layout(tile_size: u32, solid_types: HashSet<String>) -> Self {
        let mut grid = Self::new(tile_size, solid_types);
        for i in 0..10 {
            grid.set(Tile::new("grass", 1, GridCoord::new(3 + i, 10)));
            grid.set(Tile::new("stone", 1, GridCoord::new(10, 5 + i)));
        }
        grid
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.tile_size, config.solid_tile_types.clone())
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn is_solid_type(&self, tile_type: &str) -> bool {
        self.solid_types.contains(tile_type)
    }

    /// Stores `tile` at its own grid position, replacing any previous tile there.
    pub fn set(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.grid_position, tile)
    }

    pub fn remove(&mut self, coord: GridCoord) -> Option<Tile> {
        self.tiles.remove(&coord)
    }

    pub fn get(&self, coord: GridCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn push_offgrid(&mut self, tile: OffgridTile) {
        self.offgrid.push(tile);
    }

    pub fn offgrid_tiles(&self) -> &[OffgridTile] {
        &self.offgrid
    }

    /// Drops every off-grid tile for which `hit` returns true and reports how
    /// many were removed.
    pub fn remove_offgrid_where(&mut self, mut hit: impl FnMut(&OffgridTile) -> bool) -> usize {
        let before = self.offgrid.len();
        self.offgrid.retain(|tile| !hit(tile));
        before - self.offgrid.len()
    }

    pub fn neighbors(&self, pixel_position: Vec2) -> Vec<&Tile> {
        let center = GridCoord::from_pixel(pixel_position, self.tile_size);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| self.tiles.get(&center.offset(dx, dy)))
            .collect()
    }

    pub fn physics_rects(&self, pixel_position: Vec2) -> Vec<Rect> {
        let ts = self.tile_size as f32;
        self.neighbors(pixel_position)
            .into_iter()
            .filter(|tile| self.is_solid_type(&tile.tile_type))
            .map(|tile| {
                let origin = tile.grid_position.to_pixel(self.tile_size);
                Rect::new(origin.x as f32, origin.y as f32, ts, ts)
            })
            .collect()
    }

    pub fn solid_tile_at(&self, pixel_position: Vec2) -> Option<&Tile> {
        self.get(GridCoord::from_pixel(pixel_position, self.tile_size))
            .filter(|tile| self.is_solid_type(&tile.tile_type))
    }

    pub fn visible_tiles(&self, viewport: (u32, u32), offset: IVec2) -> Vec<&Tile> {
        VisibleTileRange::for_viewport(viewport, offset, self.tile_size)
            .coords()
            .filter_map(|coord| self.tiles.get(&coord))
            .collect()
    }

    /// Off-grid decor first, then the visible grid tiles. Tiles whose image
    /// `lookup` cannot resolve are skipped.
    pub fn draw(
        &self,
        viewport: (u32, u32),
        offset: IVec2,
        lookup: impl Fn(&str, u32) -> Option<ImageHandle>,
        out: &mut RenderList,
    ) {
        for tile in &self.offgrid {
            if let Some(image) = lookup(&tile.tile_type, tile.variant) {
                let position = (tile.pixel_position - offset.as_vec2()).floored();
                out.push(DrawCommand::new(image, position));
            }
        }
        for tile in self.visible_tiles(viewport, offset) {
            if let Some(image) = lookup(&tile.tile_type, tile.variant) {
                let origin = tile.grid_position.to_pixel(self.tile_size);
                let position = IVec2::new(origin.x - offset.x, origin.y - offset.y);
                out.push(DrawCommand::new(image, position));
            }
        }
    }
}
