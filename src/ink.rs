// The persistent ink layer: everything written this session, kept apart
// from the live camera image and composited over it every frame.
// Strokes only ever add ink; the only way to remove it is `clear`.

use crate::types::{Point, pack_rgb, unpack_rgb};

pub struct InkLayer {
    pub width: usize,
    pub height: usize,
    pub color: Vec<u32>,  // ink color per pixel, 0x00RRGGBB
    pub alpha: Vec<f32>,  // coverage per pixel in [0,1]; 0 = no ink
}

impl InkLayer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color: vec![0u32; width * height],
            alpha: vec![0.0; width * height],
        }
    }

    /// Wipe all ink.
    pub fn clear(&mut self) {
        for a in &mut self.alpha { *a = 0.0; }
        for c in &mut self.color { *c = 0; }
    }

    /// True when no pixel carries any ink.
    pub fn is_blank(&self) -> bool {
        self.alpha.iter().all(|&a| a <= 0.0)
    }

    /// Coverage at one pixel (0 outside the layer).
    pub fn coverage_at(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.alpha[y * self.width + x]
    }

    /// Stroke a straight segment from `a` to `b` (pixel coordinates) with
    /// round caps. Consecutive segments sharing an endpoint therefore join
    /// round as well. Edges are anti-aliased over one pixel.
    pub fn stroke_segment(&mut self, a: Point, b: Point, width: f32, color: u32) {
        let half = (width / 2.0).max(0.5);
        let reach = half + 1.0;

        // Bounding box of the capsule, clipped to the layer.
        let x0 = ((a.x.min(b.x) - reach).floor().max(0.0)) as usize;
        let y0 = ((a.y.min(b.y) - reach).floor().max(0.0)) as usize;
        let x1 = (a.x.max(b.x) + reach).ceil();
        let y1 = (a.y.max(b.y) + reach).ceil();
        if x1 < 0.0 || y1 < 0.0 {
            return;
        }
        let x1 = (x1 as usize).min(self.width);
        let y1 = (y1 as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                // Sample at the pixel center.
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = distance_to_segment(p, a, b);
                let cov = (half + 0.5 - d).clamp(0.0, 1.0);
                if cov <= 0.0 {
                    continue;
                }
                self.paint(y * self.width + x, color, cov);
            }
        }
    }

    /// Source-over: new ink with coverage `cov` on top of what is there.
    fn paint(&mut self, idx: usize, color: u32, cov: f32) {
        let under_a = self.alpha[idx];
        if cov >= 1.0 {
            self.color[idx] = color;
            self.alpha[idx] = 1.0;
            return;
        }
        if under_a <= 0.0 {
            self.color[idx] = color;
            self.alpha[idx] = cov;
            return;
        }

        let out_a = cov + under_a * (1.0 - cov);
        let (nr, ng, nb) = unpack_rgb(color);
        let (or, og, ob) = unpack_rgb(self.color[idx]);
        let mix = |n: u8, o: u8| {
            let v = (n as f32 * cov + o as f32 * under_a * (1.0 - cov)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.color[idx] = pack_rgb(mix(nr, or), mix(ng, og), mix(nb, ob));
        self.alpha[idx] = out_a.min(1.0);
    }
}

/// Euclidean distance from `p` to the segment `a`-`b` (a point if a == b).
fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = 0x00_FF_00_00;
    const BLUE: u32 = 0x00_00_00_FF;

    #[test]
    fn test_new_layer_is_blank() {
        let ink = InkLayer::new(32, 16);
        assert!(ink.is_blank());
        assert_eq!(ink.alpha.len(), 32 * 16);
    }

    #[test]
    fn test_segment_covers_its_path_only() {
        let mut ink = InkLayer::new(64, 64);
        ink.stroke_segment(Point::new(10.0, 32.0), Point::new(50.0, 32.0), 4.0, RED);

        assert_eq!(ink.coverage_at(30, 31), 1.0);
        assert_eq!(ink.color[31 * 64 + 30], RED);
        assert_eq!(ink.coverage_at(30, 10), 0.0);
        assert_eq!(ink.coverage_at(60, 31), 0.0);
    }

    #[test]
    fn test_round_cap_extends_past_endpoint() {
        let mut ink = InkLayer::new(64, 64);
        ink.stroke_segment(Point::new(20.0, 20.0), Point::new(40.0, 20.0), 10.0, RED);
        // 3px past the end, on the axis: inside the cap
        assert!(ink.coverage_at(42, 19) > 0.9);
        // diagonal corner of the square cap: outside the round one
        assert_eq!(ink.coverage_at(44, 24), 0.0);
    }

    #[test]
    fn test_zero_length_segment_is_a_dot() {
        let mut ink = InkLayer::new(16, 16);
        ink.stroke_segment(Point::new(8.0, 8.0), Point::new(8.0, 8.0), 6.0, RED);
        assert!(!ink.is_blank());
        assert_eq!(ink.coverage_at(7, 7), 1.0);
    }

    #[test]
    fn test_off_surface_segment_is_clipped() {
        let mut ink = InkLayer::new(16, 16);
        ink.stroke_segment(Point::new(-50.0, -50.0), Point::new(-40.0, -45.0), 3.0, RED);
        assert!(ink.is_blank());
        ink.stroke_segment(Point::new(100.0, 100.0), Point::new(120.0, 130.0), 3.0, RED);
        assert!(ink.is_blank());
    }

    #[test]
    fn test_later_strokes_paint_over() {
        let mut ink = InkLayer::new(32, 32);
        ink.stroke_segment(Point::new(4.0, 16.0), Point::new(28.0, 16.0), 6.0, RED);
        ink.stroke_segment(Point::new(16.0, 4.0), Point::new(16.0, 28.0), 6.0, BLUE);
        assert_eq!(ink.color[15 * 32 + 15], BLUE);
        assert_eq!(ink.color[15 * 32 + 6], RED);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut ink = InkLayer::new(32, 32);
        ink.stroke_segment(Point::new(0.0, 0.0), Point::new(31.0, 31.0), 8.0, RED);
        assert!(!ink.is_blank());
        ink.clear();
        assert!(ink.is_blank());
    }
}
