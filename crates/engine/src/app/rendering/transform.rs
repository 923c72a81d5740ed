use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Maps a window-space cursor to the display pixel under it.
///
/// The display is scaled by the largest whole factor that fits the window
/// (at least 1) and centered, leaving borders on both sides; positions over a
/// border map to `None`. Matches the layout `pixels` presents the framebuffer
/// with, for callers that have no live surface.
pub fn window_to_display_px(window_px: Vec2, window: Viewport, display: Viewport) -> Option<Vec2> {
    if window.width == 0 || window.height == 0 || display.width == 0 || display.height == 0 {
        return None;
    }
    let width_ratio = window.width as f32 / display.width as f32;
    let height_ratio = window.height as f32 / display.height as f32;
    let scale = width_ratio.min(height_ratio).floor().max(1.0);
    let border_x = (window.width as f32 - display.width as f32 * scale) / 2.0;
    let border_y = (window.height as f32 - display.height as f32 * scale) / 2.0;

    let x = ((window_px.x - border_x) / scale).floor();
    let y = ((window_px.y - border_y) / scale).floor();
    if x < 0.0 || y < 0.0 || x >= display.width as f32 || y >= display.height as f32 {
        return None;
    }
    Some(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: Viewport = Viewport::new(320, 240);

    #[test]
    fn double_size_window_halves_cursor() {
        let window = Viewport::new(640, 480);
        let position =
            window_to_display_px(Vec2::new(200.0, 101.0), window, DISPLAY).expect("mapped");
        assert_eq!(position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn non_multiple_window_is_letterboxed_at_whole_scale() {
        let window = Viewport::new(800, 600);

        assert_eq!(
            window_to_display_px(Vec2::new(80.0, 60.0), window, DISPLAY),
            Some(Vec2::ZERO)
        );
        assert_eq!(
            window_to_display_px(Vec2::new(400.0, 300.0), window, DISPLAY),
            Some(Vec2::new(160.0, 120.0))
        );
        assert_eq!(
            window_to_display_px(Vec2::new(719.0, 539.0), window, DISPLAY),
            Some(Vec2::new(319.0, 239.0))
        );
    }

    #[test]
    fn cursor_over_border_maps_nothing() {
        let window = Viewport::new(800, 600);
        assert!(window_to_display_px(Vec2::new(79.0, 300.0), window, DISPLAY).is_none());
        assert!(window_to_display_px(Vec2::new(400.0, 540.0), window, DISPLAY).is_none());
    }

    #[test]
    fn window_smaller_than_display_is_not_shrunk() {
        let window = Viewport::new(160, 120);
        assert_eq!(
            window_to_display_px(Vec2::new(0.0, 0.0), window, DISPLAY),
            Some(Vec2::new(80.0, 60.0))
        );
    }

    #[test]
    fn minimized_window_maps_nothing() {
        let window = Viewport::new(0, 0);
        assert!(window_to_display_px(Vec2::new(1.0, 1.0), window, DISPLAY).is_none());
    }
}
