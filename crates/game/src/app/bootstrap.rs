use engine::world::{Clouds, TileGrid, WorldConfig};
use engine::{
    load_level_if_exists, resolve_app_paths, AppError, AssetLibrary, ImageStore, LoopConfig,
    Scene,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::GameScene;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) images: ImageStore,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
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
    let grid = match load_level_if_exists(&paths.level_path, &world_config)? {
        Some(grid) => grid,
        None => {
            info!("using_demo_layout");
            TileGrid::with_demo_layout(
                world_config.tile_size,
                world_config.solid_tile_types.clone(),
            )
        }
    };

    let config = LoopConfig {
        window_title: "ninja game".to_string(),
        ..LoopConfig::default()
    };
    let clouds = Clouds::new(
        assets.cloud_images(),
        world_config.cloud_count,
        &mut SmallRng::from_entropy(),
    );
    let scene = GameScene::new(world_config, config.display().size(), assets, grid, clouds);

    Ok(AppWiring {
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
