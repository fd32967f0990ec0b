// Core value types shared by the gesture filter, the ink layer and the compositor.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Fill every pixel with one color.
    pub fn fill(&mut self, color: u32) {
        for p in &mut self.pixels { *p = color; }
    }
}

/// A 2-D position. Used both for normalized landmark coordinates ([0,1])
/// and for pixel coordinates on the surface; the owner says which.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Exponential smoothing step: `previous*(1-alpha) + self*alpha`.
    pub fn smoothed_from(self, previous: Point, alpha: f32) -> Point {
        Point::new(
            previous.x * (1.0 - alpha) + self.x * alpha,
            previous.y * (1.0 - alpha) + self.y * alpha,
        )
    }

    /// Normalized [0,1] -> pixel coordinates on a `width` x `height` surface.
    pub fn to_pixels(self, width: usize, height: usize) -> Point {
        Point::new(self.x * width as f32, self.y * height as f32)
    }
}

/// Pack three channels as 0x00RRGGBB.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split 0x00RRGGBB into channels.
#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}
