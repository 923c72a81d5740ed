use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start or end with '/'")]
    DanglingSlash,
    #[error("asset key must not contain '\\\\'")]
    Backslash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys name assets relative to the image root without an extension, e.g.
/// `tiles/grass` or `entities/player/idle`.
pub fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(AssetKeyError::DanglingSlash);
    }
    if key.contains('\\') {
        return Err(AssetKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    if let Some(character) = key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        return Err(AssetKeyError::InvalidCharacter { character });
    }
    Ok(())
}

/// Directory holding every frame or variant of `key`.
pub fn asset_dir(images_root: &Path, key: &str) -> Result<PathBuf, AssetKeyError> {
    validate_asset_key(key)?;
    Ok(key.split('/').fold(images_root.to_path_buf(), |path, part| path.join(part)))
}

/// Single `.png` file for `key`.
pub fn asset_file(images_root: &Path, key: &str) -> Result<PathBuf, AssetKeyError> {
    let dir = asset_dir(images_root, key)?;
    Ok(dir.with_extension("png"))
}
