use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::content::{ImageStore, StoredImage};
use crate::world::{DrawCommand, RenderList, Vec2, OPAQUE};

use super::{Viewport, CLEAR_COLOR};

/// Software blitter over a fixed low-resolution framebuffer. `pixels` scales
/// the framebuffer up to whatever size the window surface has.
pub struct Renderer {
    pixels: Pixels<'static>,
    display: Viewport,
    warned_missing_images: bool,
}

impl Renderer {
    pub fn new(window: Arc<Window>, display: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(display.width, display.height, surface)?;
        Ok(Self {
            pixels,
            display,
            warned_missing_images: false,
        })
    }

    /// Display pixel under a window-space cursor, using the same letterboxed
    /// integer scaling `pixels` draws with. `None` over the borders.
    pub fn window_to_display_px(&self, window_px: Vec2) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((window_px.x, window_px.y))
            .ok()
            .map(|(x, y)| Vec2::new(x as f32, y as f32))
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn render(&mut self, images: &ImageStore, list: &RenderList) -> Result<(), Error> {
        let Viewport { width, height } = self.display;
        let frame = self.pixels.frame_mut();
        clear_frame(frame, CLEAR_COLOR);

        let mut missing = 0usize;
        for command in list.commands() {
            match images.get(command.image) {
                Some(image) => blit(frame, width, height, image, command),
                None => missing += 1,
            }
        }
        if missing > 0 && !self.warned_missing_images {
            self.warned_missing_images = true;
            warn!(missing, "renderer_image_handle_missing");
        }

        self.pixels.render()
    }
}

fn clear_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

/// Draws `image` with its top-left corner at `command.position`, clipped to
/// the frame. Fully transparent source pixels are skipped; partial alpha
/// (per-pixel times the command alpha) blends over the frame.
fn blit(frame: &mut [u8], width: u32, height: u32, image: &StoredImage, command: &DrawCommand) {
    if image.width == 0 || image.height == 0 || width == 0 || height == 0 {
        return;
    }
    let expected_rgba_len = image.width as usize * image.height as usize * 4;
    if image.rgba.len() < expected_rgba_len || command.alpha == 0 {
        return;
    }

    let left = command.position.x;
    let top = command.position.y;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = left.saturating_add(image.width as i32).min(width as i32);
    let draw_bottom = top.saturating_add(image.height as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = width as usize;
    let image_width = image.width as usize;
    for out_y in draw_top..draw_bottom {
        let src_y = (out_y - top) as usize;
        let src_row_offset = src_y * image_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = (out_x - left) as usize;
            let src_x = if command.flip_x {
                image_width - 1 - dx
            } else {
                dx
            };
            let src = &image.rgba[src_row_offset + src_x * 4..src_row_offset + src_x * 4 + 4];
            let alpha = scale_alpha(src[3], command.alpha);
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            let dst = &mut frame[dst_offset..dst_offset + 4];
            if alpha == OPAQUE {
                dst[..3].copy_from_slice(&src[..3]);
            } else {
                for channel in 0..3 {
                    dst[channel] = blend_channel(src[channel], dst[channel], alpha);
                }
            }
            dst[3] = OPAQUE;
        }
    }
}

fn scale_alpha(pixel_alpha: u8, command_alpha: u8) -> u8 {
    ((pixel_alpha as u16 * command_alpha as u16 + 127) / 255) as u8
}

fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = alpha as u16;
    ((src as u16 * alpha + dst as u16 * (255 - alpha) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ImageHandle, IVec2};

    const W: u32 = 4;
    const H: u32 = 3;

    fn frame() -> Vec<u8> {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        clear_frame(&mut frame, [10, 20, 30, 255]);
        frame
    }

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * W + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    /// 2x1 image: red on the left, green on the right.
    fn red_green() -> StoredImage {
        StoredImage {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 255, 0, 255],
        }
    }

    fn command(x: i32, y: i32) -> DrawCommand {
        DrawCommand::new(
            ImageHandle {
                id: 0,
                width: 2,
                height: 1,
            },
            IVec2::new(x, y),
        )
    }

    #[test]
    fn blit_copies_opaque_pixels_at_position() {
        let mut frame = frame();
        blit(&mut frame, W, H, &red_green(), &command(1, 2));

        assert_eq!(pixel(&frame, 1, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 2, 2), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 0, 2), [10, 20, 30, 255]);
    }

    #[test]
    fn blit_flips_horizontally() {
        let mut frame = frame();
        blit(&mut frame, W, H, &red_green(), &command(0, 0).flipped(true));

        assert_eq!(pixel(&frame, 0, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 1, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn blit_clips_at_frame_edges() {
        let mut frame = frame();
        blit(&mut frame, W, H, &red_green(), &command(-1, 0));
        blit(&mut frame, W, H, &red_green(), &command(3, 1));
        blit(&mut frame, W, H, &red_green(), &command(10, 10));

        assert_eq!(pixel(&frame, 0, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 3, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_source_pixels_are_skipped() {
        let mut frame = frame();
        let image = StoredImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 0],
        };
        blit(&mut frame, W, H, &image, &command(0, 0));

        assert_eq!(pixel(&frame, 0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn command_alpha_blends_over_frame() {
        let mut frame = frame();
        clear_frame(&mut frame, [0, 0, 0, 255]);
        blit(&mut frame, W, H, &red_green(), &command(0, 0).with_alpha(100));

        assert_eq!(pixel(&frame, 0, 0), [100, 0, 0, 255]);
    }

    #[test]
    fn alpha_scaling_keeps_extremes() {
        assert_eq!(scale_alpha(255, 255), 255);
        assert_eq!(scale_alpha(255, 0), 0);
        assert_eq!(scale_alpha(0, 255), 0);
        assert_eq!(blend_channel(200, 50, 255), 200);
        assert_eq!(blend_channel(200, 50, 0), 50);
    }
}
