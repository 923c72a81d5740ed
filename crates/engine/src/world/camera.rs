use super::geometry::{IVec2, Vec2};

/// Scroll follow with exponential smoothing.
///
/// Each update closes `1 / smoothing_steps` of the remaining distance to the
/// point that would center the target, so a stationary target is approached
/// asymptotically and never overshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    scroll: Vec2,
    smoothing_steps: f32,
}

impl Camera {
    pub fn new(smoothing_steps: f32) -> Self {
        assert!(
            smoothing_steps.is_finite() && smoothing_steps >= 1.0,
            "camera smoothing steps must be >= 1, got {smoothing_steps}"
        );
        Self {
            scroll: Vec2::ZERO,
            smoothing_steps,
        }
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn update(&mut self, target: Vec2, viewport: (u32, u32)) {
        let desired = centered_scroll(target, viewport);
        self.scroll.x += (desired.x - self.scroll.x) / self.smoothing_steps;
        self.scroll.y += (desired.y - self.scroll.y) / self.smoothing_steps;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.scroll = self.scroll + delta;
    }

    /// Integer offset for pixel-art rendering; the float scroll is kept for
    /// smooth convergence.
    pub fn render_offset(&self) -> IVec2 {
        self.scroll.truncated()
    }
}

fn centered_scroll(target: Vec2, viewport: (u32, u32)) -> Vec2 {
    Vec2::new(
        target.x - viewport.0 as f32 / 2.0,
        target.y - viewport.1 as f32 / 2.0,
    )
}
