use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Truncates toward zero, matching how pixel positions are handed to the blitter.
    pub fn truncated(self) -> IVec2 {
        IVec2 {
            x: self.x as i32,
            y: self.y as i32,
        }
    }

    pub fn floored(self) -> IVec2 {
        IVec2 {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer pixel position or size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Grid cell address. Doubles as the tile grid's hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing `pixel`, using floor division so negative positions
    /// land in negative cells.
    pub fn from_pixel(pixel: Vec2, tile_size: u32) -> Self {
        let ts = tile_size as f32;
        Self {
            x: (pixel.x / ts).floor() as i32,
            y: (pixel.y / ts).floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn to_pixel(self, tile_size: u32) -> IVec2 {
        let ts = tile_size as i32;
        IVec2::new(self.x * ts, self.y * ts)
    }
}

/// Axis-aligned rectangle in pixel space, top-left anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixel_floors_negative_positions() {
        assert_eq!(
            GridCoord::from_pixel(Vec2::new(-1.0, -16.0), 16),
            GridCoord::new(-1, -1)
        );
        assert_eq!(
            GridCoord::from_pixel(Vec2::new(-17.0, 15.9), 16),
            GridCoord::new(-2, 0)
        );
        assert_eq!(
            GridCoord::from_pixel(Vec2::new(32.0, 47.5), 16),
            GridCoord::new(2, 2)
        );
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(15.5, 8.0, 4.0, 4.0)));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut rect = Rect::new(3.0, 4.0, 8.0, 15.0);
        rect.set_right(40.0);
        rect.set_bottom(160.0);
        assert_eq!(rect, Rect::new(32.0, 145.0, 8.0, 15.0));
    }

    #[test]
    fn truncation_rounds_toward_zero() {
        assert_eq!(Vec2::new(10.9, -3.7).truncated(), IVec2::new(10, -3));
    }
}
