mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{window_to_display_px, Viewport};

/// Frame clear color behind everything a scene draws.
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
