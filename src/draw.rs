// Window + software drawing utilities.
// 1) A window that shows the composed frame and reports keys and the mouse.
// 2) Pixel, line and circle primitives for the gesture overlay.
// 3) A tiny 5x7 bitmap font for HUD text on top of the video.

use crate::error::Error;
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
    width: usize,
    height: usize,
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // Keeps the loop from spinning while the camera is paused.
        window.set_target_fps(60);
        Ok(Self { window, width, height })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// True on the frame a key goes down (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Mouse position normalized to [0,1] of the window, `None` when outside.
    pub fn mouse_normalized(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x / self.width as f32, y / self.height as f32))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }
}

/* ---------- Software drawing: pixels, lines, circles ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a 1-pixel line between (x0,y0) and (x1,y1) using Bresenham.
/// The line is clipped to the framebuffer first, so far-off endpoints are cheap.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let Some((x0, y0, x1, y1)) = clip_line(fb, x0, y0, x1, y1) else { return };
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0 as i32, y0 as i32, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Liang-Barsky clip against a one-pixel margin around the framebuffer.
/// Returns the clipped endpoints (as i64, so Bresenham can't overflow),
/// or `None` when the line misses the frame.
fn clip_line(fb: &FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i64, i64, i64, i64)> {
    let (xmin, ymin) = (-1.0, -1.0);
    let (xmax, ymax) = (fb.width as f64, fb.height as f64);
    let (fx0, fy0) = (x0 as f64, y0 as f64);
    let (dx, dy) = (x1 as f64 - fx0, y1 as f64 - fy0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, fx0 - xmin), (dx, xmax - fx0), (-dy, fy0 - ymin), (dy, ymax - fy0)] {
        if p == 0.0 {
            if q < 0.0 { return None; }
        } else {
            let r = q / p;
            if p < 0.0 { t0 = t0.max(r); } else { t1 = t1.min(r); }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (fx0 + t0 * dx).round() as i64,
        (fy0 + t0 * dy).round() as i64,
        (fx0 + t1 * dx).round() as i64,
        (fy0 + t1 * dy).round() as i64,
    ))
}

/// Solid disc of `radius` pixels centered at (cx,cy).
pub fn fill_circle(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, color: u32) {
    draw_annulus(fb, cx, cy, 0.0, radius, color);
}

/// Circle outline: `thickness` pixels centered on `radius`.
pub fn draw_ring(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, thickness: f32, color: u32) {
    let half = thickness / 2.0;
    draw_annulus(fb, cx, cy, (radius - half).max(0.0), radius + half, color);
}

/// Every pixel whose center lies between `inner` and `outer` from (cx,cy).
fn draw_annulus(fb: &mut FrameBuffer, cx: f32, cy: f32, inner: f32, outer: f32, color: u32) {
    if outer.is_nan() || outer <= 0.0 || !cx.is_finite() || !cy.is_finite() { return; }
    let (in2, out2) = (inner * inner, outer * outer);
    // bounding box, clipped to the framebuffer
    let x0 = (cx - outer).floor().max(0.0) as i64;
    let x1 = (cx + outer).ceil().min(fb.width as f32 - 1.0) as i64;
    let y0 = (cy - outer).floor().max(0.0) as i64;
    let y1 = (cy + outer).ceil().min(fb.height as f32 - 1.0) as i64;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 <= out2 && (inner <= 0.0 || d2 >= in2) {
                put_pixel(fb, x as i32, y as i32, color);
            }
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII, digits, a little punctuation) ---------- */

pub const GLYPH_ADVANCE: i32 = 6; // 5 pixels glyph width + 1 pixel spacing

/// Return a 5x7 glyph bitmap. Lowercase is drawn as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '#' => g!(0b01010,0b01010,0b11111,0b01010,0b11111,0b01010,0b01010),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel `scale` x `scale`,
/// with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    if let Some(rows) = glyph5x7(ch) {
        for (offset, c) in [(scale.max(1), 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            put_pixel(
                                fb,
                                x + (rx * scale) + sx + offset,
                                y + (ry as i32 * scale) + sy + offset,
                                c,
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color, scale);
        x += GLYPH_ADVANCE * scale;
    }
}

/// Width in pixels `draw_text_5x7` will use for `text`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: u32 = 0x00_FF_FF_FF;

    #[test]
    fn test_put_pixel_ignores_out_of_bounds() {
        let mut fb = FrameBuffer::new(4, 4);
        put_pixel(&mut fb, -1, 0, WHITE);
        put_pixel(&mut fb, 4, 0, WHITE);
        put_pixel(&mut fb, 0, 4, WHITE);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_line_hits_both_ends() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_line(&mut fb, 1, 1, 8, 5, WHITE);
        assert_eq!(fb.pixels[1 * 10 + 1], WHITE);
        assert_eq!(fb.pixels[5 * 10 + 8], WHITE);
    }

    #[test]
    fn test_line_from_far_outside_is_clipped() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_line(&mut fb, i32::MIN, 5, i32::MAX, 5, WHITE);
        assert!((0..10).all(|x| fb.pixels[5 * 10 + x] == WHITE));
        assert_eq!(fb.pixels.iter().filter(|&&p| p == WHITE).count(), 10);

        let mut fb = FrameBuffer::new(10, 10);
        draw_line(&mut fb, 3, 3, i32::MAX, i32::MAX, WHITE);
        assert_eq!(fb.pixels[3 * 10 + 3], WHITE);
        assert_eq!(fb.pixels[9 * 10 + 9], WHITE);

        // entirely off-frame: nothing drawn
        let mut fb = FrameBuffer::new(10, 10);
        draw_line(&mut fb, -50, -50, -20, i32::MAX, WHITE);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_circles_far_outside_or_not_finite_draw_nothing() {
        let mut fb = FrameBuffer::new(10, 10);
        fill_circle(&mut fb, 1e10, 5.0, 8.0, WHITE);
        fill_circle(&mut fb, f32::NAN, 5.0, 8.0, WHITE);
        draw_ring(&mut fb, f32::INFINITY, f32::NEG_INFINITY, 12.0, 3.0, WHITE);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_ring_is_hollow() {
        let mut fb = FrameBuffer::new(40, 40);
        draw_ring(&mut fb, 20.0, 20.0, 12.0, 3.0, WHITE);
        assert_eq!(fb.pixels[20 * 40 + 20], 0);
        assert_eq!(fb.pixels[19 * 40 + 31], WHITE); // on the rim, to the right
    }

    #[test]
    fn test_filled_circle_is_solid() {
        let mut fb = FrameBuffer::new(40, 40);
        fill_circle(&mut fb, 20.0, 20.0, 8.0, WHITE);
        assert_eq!(fb.pixels[19 * 40 + 19], WHITE);
        assert_eq!(fb.pixels[0], 0);
    }

    #[test]
    fn test_every_hud_character_has_a_glyph() {
        let text = "No hand detected - adjust lighting or distance. Pinch to write: [+] #0A0B0C (REC)";
        for ch in text.chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph {ch:?}");
        }
        assert_eq!(text_width("ABC", 2), 36);
    }
}
