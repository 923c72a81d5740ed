use super::geometry::IVec2;

/// Opaque reference to a decoded image owned by the glue layer.
///
/// Carries the pixel dimensions so layout code (cloud wrapping, editor
/// hit-testing) never needs the pixels themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

pub const OPAQUE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub image: ImageHandle,
    pub position: IVec2,
    pub flip_x: bool,
    pub alpha: u8,
}

impl DrawCommand {
    pub fn new(image: ImageHandle, position: IVec2) -> Self {
        Self {
            image,
            position,
            flip_x: false,
            alpha: OPAQUE,
        }
    }

    pub fn flipped(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Ordered draw list for one frame; later commands paint over earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    commands: Vec<DrawCommand>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
