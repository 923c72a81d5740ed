//! Image loading and the asset library shared by the game and the editor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info};

use super::asset_keys::{asset_dir, asset_file, AssetKeyError};
use crate::world::{Animation, ImageHandle, PlayerAction, PlayerAnimations};

/// Tile groups in palette order.
pub const TILE_GROUPS: [&str; 4] = ["decor", "grass", "large_decor", "stone"];
pub const BACKGROUND_KEY: &str = "background";
pub const CLOUDS_KEY: &str = "clouds";
/// Pixels of exactly this color become fully transparent.
pub const COLOR_KEY: [u8; 3] = [0, 0, 0];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to list image directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open image '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image directory '{path}' contains no .png files")]
    EmptyImageSet { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Owns decoded RGBA pixels; the world only ever sees [`ImageHandle`]s.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<StoredImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, width: u32, height: u32, rgba: Vec<u8>) -> ImageHandle {
        assert_eq!(
            rgba.len(),
            width as usize * height as usize * 4,
            "rgba buffer does not match {width}x{height}"
        );
        let id = self.images.len() as u32;
        self.images.push(StoredImage {
            width,
            height,
            rgba,
        });
        ImageHandle { id, width, height }
    }

    pub fn get(&self, handle: ImageHandle) -> Option<&StoredImage> {
        self.images.get(handle.id as usize)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub fn load_image(store: &mut ImageStore, path: &Path) -> Result<ImageHandle, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = image.dimensions();
    let mut rgba = image.into_raw();
    apply_color_key(&mut rgba);
    Ok(store.insert(width, height, rgba))
}

/// Loads every `.png` in `dir`, ordered by file name.
pub fn load_images(store: &mut ImageStore, dir: &Path) -> Result<Vec<ImageHandle>, AssetError> {
    let read_dir_error = |source: io::Error| AssetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(AssetError::EmptyImageSet {
            path: dir.to_path_buf(),
        });
    }
    paths.sort();

    let handles = paths
        .iter()
        .map(|path| load_image(store, path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(dir = %dir.display(), count = handles.len(), "image_set_loaded");
    Ok(handles)
}

fn apply_color_key(rgba: &mut [u8]) {
    for pixel in rgba.chunks_exact_mut(4) {
        if pixel[..3] == COLOR_KEY {
            pixel[3] = 0;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGroup {
    pub name: String,
    pub variants: Vec<ImageHandle>,
}

/// Every image the scenes draw, resolved once at startup. Any missing file or
/// empty set fails here rather than mid-frame.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    tile_groups: Vec<TileGroup>,
    player: PlayerAnimations,
    clouds: Vec<ImageHandle>,
    background: ImageHandle,
}

impl AssetLibrary {
    pub fn load(images_root: &Path, store: &mut ImageStore) -> Result<Self, AssetError> {
        let mut tile_groups = Vec::with_capacity(TILE_GROUPS.len());
        for name in TILE_GROUPS {
            let variants = load_key_dir(store, images_root, &format!("tiles/{name}"))?;
            tile_groups.push(TileGroup {
                name: name.to_string(),
                variants,
            });
        }

        let player = PlayerAnimations {
            idle: player_animation(store, images_root, PlayerAction::Idle)?,
            run: player_animation(store, images_root, PlayerAction::Run)?,
            jump: player_animation(store, images_root, PlayerAction::Jump)?,
        };
        let clouds = load_key_dir(store, images_root, CLOUDS_KEY)?;
        let background_path =
            asset_file(images_root, BACKGROUND_KEY).map_err(|source| AssetError::InvalidKey {
                key: BACKGROUND_KEY.to_string(),
                source,
            })?;
        let background = load_image(store, &background_path)?;

        info!(
            root = %images_root.display(),
            images = store.len(),
            tile_groups = tile_groups.len(),
            "asset_library_loaded"
        );
        Ok(Self {
            tile_groups,
            player,
            clouds,
            background,
        })
    }

    /// Assembles a library from already-loaded handles.
    pub fn from_parts(
        tile_groups: Vec<TileGroup>,
        player: PlayerAnimations,
        clouds: Vec<ImageHandle>,
        background: ImageHandle,
    ) -> Self {
        Self {
            tile_groups,
            player,
            clouds,
            background,
        }
    }

    pub fn tile_groups(&self) -> &[TileGroup] {
        &self.tile_groups
    }

    pub fn tile_group(&self, name: &str) -> Option<&TileGroup> {
        self.tile_groups.iter().find(|group| group.name == name)
    }

    /// `None` for an unknown group or out-of-range variant.
    pub fn tile_image(&self, tile_type: &str, variant: u32) -> Option<ImageHandle> {
        self.tile_group(tile_type)?
            .variants
            .get(variant as usize)
            .copied()
    }

    pub fn player_animations(&self) -> &PlayerAnimations {
        &self.player
    }

    pub fn cloud_images(&self) -> &[ImageHandle] {
        &self.clouds
    }

    pub fn background(&self) -> ImageHandle {
        self.background
    }
}

/// Frame durations in ticks per image.
fn player_animation_duration(action: PlayerAction) -> u32 {
    match action {
        PlayerAction::Idle => 6,
        PlayerAction::Run => 4,
        PlayerAction::Jump => 5,
    }
}

fn player_animation(
    store: &mut ImageStore,
    images_root: &Path,
    action: PlayerAction,
) -> Result<Animation, AssetError> {
    let key = format!("entities/player/{}", action.as_token());
    let frames = load_key_dir(store, images_root, &key)?;
    Ok(Animation::new(frames, player_animation_duration(action), true))
}

fn load_key_dir(
    store: &mut ImageStore,
    images_root: &Path,
    key: &str,
) -> Result<Vec<ImageHandle>, AssetError> {
    let dir = asset_dir(images_root, key).map_err(|source| AssetError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    load_images(store, &dir)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        RgbaImage::from_pixel(width, height, Rgba(color))
            .save(path)
            .expect("write png");
    }

    fn write_library(root: &Path) {
        for (index, group) in TILE_GROUPS.iter().enumerate() {
            for variant in 0..=index {
                write_png(
                    &root.join("tiles").join(group).join(format!("{variant}.png")),
                    16,
                    16,
                    [40, 120, 40, 255],
                );
            }
        }
        for action in PlayerAction::ALL {
            for frame in 0..2 {
                write_png(
                    &root
                        .join("entities")
                        .join("player")
                        .join(action.as_token())
                        .join(format!("{frame:02}.png")),
                    14,
                    18,
                    [200, 200, 200, 255],
                );
            }
        }
        write_png(&root.join("clouds").join("cloud_1.png"), 40, 20, [250, 250, 250, 255]);
        write_png(&root.join("background.png"), 320, 240, [30, 40, 80, 255]);
    }

    #[test]
    fn color_key_makes_black_transparent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("keyed.png");
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([10, 0, 0, 255]));
        image.save(&path).expect("write png");
        let mut store = ImageStore::new();

        let handle = load_image(&mut store, &path).expect("load");

        let stored = store.get(handle).expect("stored");
        assert_eq!(stored.rgba, vec![0, 0, 0, 0, 10, 0, 0, 255]);
        assert_eq!((handle.width, handle.height), (2, 1));
    }

    #[test]
    fn load_images_sorts_by_file_name_and_skips_other_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("1.png"), 2, 2, [1, 1, 1, 255]);
        write_png(&dir.path().join("0.png"), 3, 3, [1, 1, 1, 255]);
        fs::write(dir.path().join("notes.txt"), "skip").expect("write txt");
        let mut store = ImageStore::new();

        let handles = load_images(&mut store, dir.path()).expect("load");

        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].width, 3);
        assert_eq!(handles[1].width, 2);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_images(&mut ImageStore::new(), dir.path()).expect_err("empty");
        assert!(matches!(error, AssetError::EmptyImageSet { .. }));
    }

    #[test]
    fn library_resolves_groups_animations_and_misses() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_library(dir.path());
        let mut store = ImageStore::new();

        let library = AssetLibrary::load(dir.path(), &mut store).expect("library");

        let names: Vec<&str> = library
            .tile_groups()
            .iter()
            .map(|group| group.name.as_str())
            .collect();
        assert_eq!(names, TILE_GROUPS);
        assert_eq!(library.tile_group("stone").expect("stone").variants.len(), 4);
        assert!(library.tile_image("grass", 1).is_some());
        assert!(library.tile_image("grass", 2).is_none());
        assert!(library.tile_image("lava", 0).is_none());

        let animations = library.player_animations();
        assert_eq!(animations.get(PlayerAction::Idle).image_duration(), 6);
        assert_eq!(animations.get(PlayerAction::Run).image_duration(), 4);
        assert_eq!(animations.get(PlayerAction::Jump).image_duration(), 5);
        assert!(animations.get(PlayerAction::Run).is_looping());
        assert_eq!(library.cloud_images().len(), 1);
        assert_eq!(library.background().width, 320);
        assert!(store.get(library.background()).is_some());
    }

    #[test]
    fn missing_animation_set_fails_at_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_library(dir.path());
        fs::remove_dir_all(dir.path().join("entities").join("player").join("jump"))
            .expect("remove jump frames");

        let error = AssetLibrary::load(dir.path(), &mut ImageStore::new()).expect_err("missing");

        assert!(matches!(error, AssetError::ReadDir { .. }));
    }
}
