use engine::world::{TileGrid, WorldConfig};
use engine::{
    load_level_if_exists, resolve_app_paths, AppError, AssetLibrary, ImageStore, LoopConfig,
    Scene,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::editing::EditorScene;

pub(crate) struct EditorWiring {
    pub(crate) config: LoopConfig,
    pub(crate) images: ImageStore,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<EditorWiring, AppError> {
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        images_dir = %paths.images_dir.display(),
        level = %paths.level_path.display(),
        "startup"
    );

    let world_config = WorldConfig::default();
    let mut images = ImageStore::new();
    let assets = AssetLibrary::load(&paths.images_dir, &mut images)?;
    // A missing level starts an empty map; saving creates the file.
    let grid = load_level_if_exists(&paths.level_path, &world_config)?
        .unwrap_or_else(|| TileGrid::from_config(&world_config));

    let config = LoopConfig {
        window_title: "ninja game level editor".to_string(),
        ..LoopConfig::default()
    };
    let scene = EditorScene::new(
        &world_config,
        config.display().size(),
        assets,
        grid,
        paths.level_path,
    );

    Ok(EditorWiring {
        config,
        images,
        scene: Box::new(scene),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
