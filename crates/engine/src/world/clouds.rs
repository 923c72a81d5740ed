use rand::Rng;

use super::geometry::{IVec2, Vec2};
use super::render::{DrawCommand, ImageHandle, RenderList};

const SPAWN_X_RANGE: f32 = 99_999.0;
const SPAWN_Y_RANGE: f32 = 9_999.0;
const MIN_SPEED: f32 = 0.05;
const MAX_SPEED: f32 = 0.1;
const MIN_DEPTH: f32 = 0.2;
const MAX_DEPTH: f32 = 0.8;

/// One parallax cloud. `depth` scales how far it moves with the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub position: Vec2,
    pub image: ImageHandle,
    pub speed: f32,
    pub depth: f32,
}

impl Cloud {
    pub fn update(&mut self) {
        self.position.x += self.speed;
    }

    /// Screen position after parallax, wrapped so the cloud re-enters from the
    /// opposite edge instead of drifting out of the world.
    pub fn screen_position(&self, camera_offset: IVec2, surface: (u32, u32)) -> IVec2 {
        let x = self.position.x - camera_offset.x as f32 * self.depth;
        let y = self.position.y - camera_offset.y as f32 * self.depth;
        let span_x = (surface.0 + self.image.width) as f32;
        let span_y = (surface.1 + self.image.height) as f32;
        Vec2::new(
            x.rem_euclid(span_x) - self.image.width as f32,
            y.rem_euclid(span_y) - self.image.height as f32,
        )
        .floored()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Clouds {
    /// Scatters `count` clouds over a large area. Returns an empty set when no
    /// cloud images exist.
    pub fn new(images: &[ImageHandle], count: usize, rng: &mut impl Rng) -> Self {
        if images.is_empty() {
            return Self::default();
        }

        let mut clouds: Vec<Cloud> = (0..count)
            .map(|_| Cloud {
                position: Vec2::new(
                    rng.gen_range(0.0..SPAWN_X_RANGE),
                    rng.gen_range(0.0..SPAWN_Y_RANGE),
                ),
                image: images[rng.gen_range(0..images.len())],
                speed: rng.gen_range(MIN_SPEED..MAX_SPEED),
                depth: rng.gen_range(MIN_DEPTH..MAX_DEPTH),
            })
            .collect();
        // Far clouds first so nearer ones paint over them.
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        Self { clouds }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.update();
        }
    }

    pub fn draw(&self, camera_offset: IVec2, surface: (u32, u32), out: &mut RenderList) {
        for cloud in &self.clouds {
            out.push(DrawCommand::new(
                cloud.image,
                cloud.screen_position(camera_offset, surface),
            ));
        }
    }
}
