use std::sync::Arc;

use super::render::ImageHandle;

/// Frame-counted sprite animation.
///
/// The image list is shared between a cached template and every copy made
/// from it, so switching actions never clones image data.
#[derive(Debug, Clone)]
pub struct Animation {
    images: Arc<[ImageHandle]>,
    image_duration: u32,
    looping: bool,
    frame: u32,
    done: bool,
}

impl Animation {
    pub fn new(images: impl Into<Arc<[ImageHandle]>>, image_duration: u32, looping: bool) -> Self {
        let images = images.into();
        assert!(!images.is_empty(), "animation needs at least one image");
        assert!(image_duration > 0, "animation image duration must be positive");
        Self {
            images,
            image_duration,
            looping,
            frame: 0,
            done: false,
        }
    }

    /// Fresh playback of the same images, starting at frame zero.
    pub fn reset_copy(&self) -> Self {
        Self {
            images: Arc::clone(&self.images),
            image_duration: self.image_duration,
            looping: self.looping,
            frame: 0,
            done: false,
        }
    }

    pub fn total_frames(&self) -> u32 {
        self.image_duration * self.images.len() as u32
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn image_duration(&self) -> u32 {
        self.image_duration
    }

    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }

    pub fn advance(&mut self) {
        let total = self.total_frames();
        if self.looping {
            self.frame = (self.frame + 1) % total;
        } else {
            self.frame = (self.frame + 1).min(total - 1);
            if self.frame >= total - 1 {
                self.done = true;
            }
        }
    }

    pub fn current_index(&self) -> usize {
        (self.frame / self.image_duration) as usize
    }

    pub fn current_image(&self) -> ImageHandle {
        self.images[self.current_index()]
    }
}
