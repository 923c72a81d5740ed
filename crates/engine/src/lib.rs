use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod world;

pub use app::{
    run_app, window_to_display_px, AppError, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, Renderer, Scene, SceneCommand, Viewport, CLEAR_COLOR,
};
pub use content::{
    load_image, load_images, load_level, load_level_if_exists, parse_level, save_level,
    AssetError, AssetLibrary, ImageStore, LevelError, TileGroup, TILE_GROUPS,
};

pub const ROOT_ENV_VAR: &str = "NINJA_ROOT";
pub const LEVEL_ENV_VAR: &str = "NINJA_LEVEL";
pub const DEFAULT_LEVEL_PATH: &str = "data/maps/0.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub level_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "NINJA_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or data/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or data/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/ninja\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
    #[error("image directory does not exist: {0}")]
    MissingImagesDir(PathBuf),
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let level_override = read_env(LEVEL_ENV_VAR)?;
    let paths = app_paths_for_root(root, level_override.as_deref());
    if !paths.images_dir.is_dir() {
        return Err(StartupError::MissingImagesDir(paths.images_dir));
    }
    Ok(paths)
}

/// Lays out the data directories under `root`. A relative level override is
/// taken relative to the root, not the working directory.
pub fn app_paths_for_root(root: PathBuf, level_override: Option<&str>) -> AppPaths {
    let images_dir = root.join("data").join("images");
    let level_path = match level_override {
        Some(level) if Path::new(level).is_absolute() => PathBuf::from(level),
        Some(level) => root.join(level),
        None => root.join(DEFAULT_LEVEL_PATH),
    };
    AppPaths {
        root,
        images_dir,
        level_path,
    }
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    if let Some(value) = read_env(ROOT_ENV_VAR)? {
        let normalized = normalize_path(Path::new(&value));
        return if is_repo_marker(&normalized) {
            Ok(normalized)
        } else {
            Err(StartupError::InvalidEnvRoot { path: normalized })
        };
    }

    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

    find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
        start_dir: normalize_path(&exe_dir),
        env_var: ROOT_ENV_VAR,
    })
}

fn find_root_above(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_data = path.join("data").is_dir();

    cargo_toml && (has_crates || has_data)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
