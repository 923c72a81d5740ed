//! Persisted level format.
//!
//! ```json
//! {
//!   "tilemap": { "3;10": { "type": "grass", "variant": 1, "pos": [3, 10] } },
//!   "offgrid": [ { "type": "decor", "variant": 0, "pos": [41.5, 130.0] } ],
//!   "tile_size": 16
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::atomic_io::write_text_atomic;
use crate::world::{
    CoordKey, CoordKeyError, GridCoord, OffgridTile, Tile, TileGrid, Vec2, WorldConfig,
};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write level '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level json at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode level json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid tile key: {0}")]
    InvalidKey(#[from] CoordKeyError),
    #[error("tile key '{key}' does not match its pos [{x}, {y}]")]
    KeyPositionMismatch { key: String, x: i32, y: i32 },
    #[error("level tile_size {tile_size} cannot hold a {min}px entity")]
    TileSizeTooSmall { tile_size: u32, min: u32 },
    #[error("off-grid tile #{index} has a non-finite position")]
    NonFiniteOffgrid { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LevelFile {
    tilemap: BTreeMap<String, TileRecord>,
    #[serde(default)]
    offgrid: Vec<OffgridRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tile_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TileRecord {
    #[serde(rename = "type")]
    tile_type: String,
    variant: u32,
    pos: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OffgridRecord {
    #[serde(rename = "type")]
    tile_type: String,
    variant: u32,
    pos: [f32; 2],
}

pub fn load_level(path: &Path, config: &WorldConfig) -> Result<TileGrid, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_level(&raw, config)?;
    info!(
        path = %path.display(),
        tiles = grid.len(),
        offgrid = grid.offgrid_tiles().len(),
        "level_loaded"
    );
    Ok(grid)
}

/// Like [`load_level`], but a missing file is `Ok(None)` so callers can fall
/// back to a fresh layout.
pub fn load_level_if_exists(
    path: &Path,
    config: &WorldConfig,
) -> Result<Option<TileGrid>, LevelError> {
    match load_level(path, config) {
        Ok(grid) => Ok(Some(grid)),
        Err(LevelError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "level_file_missing");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

pub fn save_level(path: &Path, grid: &TileGrid) -> Result<(), LevelError> {
    let json = level_to_json(grid)?;
    write_text_atomic(path, &json).map_err(|source| LevelError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        tiles = grid.len(),
        offgrid = grid.offgrid_tiles().len(),
        "level_saved"
    );
    Ok(())
}

/// Builds a grid from level json. The file's `tile_size`, when present, wins
/// over the config's; solidity always comes from the config.
pub fn parse_level(raw: &str, config: &WorldConfig) -> Result<TileGrid, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file: LevelFile = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        LevelError::Parse {
            json_path,
            source: error.into_inner(),
        }
    })?;

    let tile_size = file.tile_size.unwrap_or(config.tile_size);
    let min = config.player_size.x.max(config.player_size.y).max(1) as u32;
    if tile_size < min {
        return Err(LevelError::TileSizeTooSmall { tile_size, min });
    }

    let mut grid = TileGrid::new(tile_size, config.solid_tile_types.clone());
    for (key, record) in file.tilemap {
        let CoordKey(coord) = key.parse()?;
        let [x, y] = record.pos;
        if coord != GridCoord::new(x, y) {
            return Err(LevelError::KeyPositionMismatch { key, x, y });
        }
        grid.set(Tile::new(record.tile_type, record.variant, coord));
    }
    for (index, record) in file.offgrid.into_iter().enumerate() {
        let pixel_position = Vec2::new(record.pos[0], record.pos[1]);
        if !pixel_position.is_finite() {
            return Err(LevelError::NonFiniteOffgrid { index });
        }
        grid.push_offgrid(OffgridTile {
            tile_type: record.tile_type,
            variant: record.variant,
            pixel_position,
        });
    }
    Ok(grid)
}

pub fn level_to_json(grid: &TileGrid) -> Result<String, LevelError> {
    let tilemap = grid
        .tiles()
        .map(|tile| {
            let pos = tile.grid_position;
            (
                CoordKey(pos).to_string(),
                TileRecord {
                    tile_type: tile.tile_type.clone(),
                    variant: tile.variant,
                    pos: [pos.x, pos.y],
                },
            )
        })
        .collect();
    let offgrid = grid
        .offgrid_tiles()
        .iter()
        .map(|tile| OffgridRecord {
            tile_type: tile.tile_type.clone(),
            variant: tile.variant,
            pos: [tile.pixel_position.x, tile.pixel_position.y],
        })
        .collect();
    let file = LevelFile {
        tilemap,
        offgrid,
        tile_size: Some(grid.tile_size()),
    };
    serde_json::to_string_pretty(&file).map_err(LevelError::Encode)
}
