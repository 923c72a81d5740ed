mod asset_keys;
mod assets;
mod atomic_io;
mod level;

pub use asset_keys::{asset_dir, asset_file, validate_asset_key, AssetKeyError};
pub use assets::{
    load_image, load_images, AssetError, AssetLibrary, ImageStore, StoredImage, TileGroup,
    BACKGROUND_KEY, CLOUDS_KEY, COLOR_KEY, TILE_GROUPS,
};
pub use level::{
    level_to_json, load_level, load_level_if_exists, parse_level, save_level, LevelError,
};
