// Builds the visible frame: camera image, then ink, then the live hand overlay.
// Holds no state of its own; everything comes in as arguments each frame.

use crate::draw::{draw_line, draw_ring, fill_circle};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::gesture::GestureReading;
use crate::ink::InkLayer;
use crate::landmarks::{HAND_CONNECTIONS, Hand};
use crate::types::{FrameBuffer, Point, pack_rgb, unpack_rgb};

const SKELETON_COLOR: u32 = 0x00_FF_FF_FF;
const JOINT_COLOR: u32 = 0x00_FF_00_00;
const JOINT_RADIUS: f32 = 2.0;

const PEN_COLOR: u32 = 0x00_FF_00_00;
const PEN_OUTLINE: u32 = 0x00_FF_FF_FF;
const PEN_RADIUS: f32 = 8.0;
const PEN_OUTLINE_WIDTH: f32 = 2.0;

const HOVER_RADIUS: f32 = 12.0;
const HOVER_WIDTH: f32 = 3.0;

/// The hand-dependent part of a frame.
pub struct Overlay<'a> {
    pub hand: &'a Hand,
    pub reading: &'a GestureReading,
    /// End of the stroke path, where the pen dot goes. `None` while hovering.
    pub pen: Option<Point>,
    /// Ink color, used for the hover rings.
    pub color: u32,
}

/// Compose one visible frame into `screen`, strictly in this order:
/// camera image (overwrites every pixel, so nothing from the last frame
/// survives), ink, then (if a hand is present) skeleton and cursor.
pub fn compose(
    screen: &mut FrameBuffer,
    live: &FrameBuffer,
    ink: &InkLayer,
    lut: &GammaLut,
    overlay: Option<&Overlay>,
) -> Result<(), Error> {
    if screen.width != live.width || screen.height != live.height {
        return Err(Error::CameraFrame("compose: camera frame size changed".into()));
    }

    screen.pixels.copy_from_slice(&live.pixels);
    blend_ink_in_place(screen, ink, lut)?;

    if let Some(overlay) = overlay {
        draw_skeleton(screen, overlay.hand);
        draw_cursor(screen, overlay);
    }
    Ok(())
}

/// Lay ink over the frame, mixing partial coverage in linear light.
pub fn blend_ink_in_place(fb: &mut FrameBuffer, ink: &InkLayer, lut: &GammaLut) -> Result<(), Error> {
    if ink.width != fb.width || ink.height != fb.height {
        return Err(Error::CameraFrame("blend: ink dimension mismatch".into()));
    }

    for i in 0..fb.pixels.len() {
        let a = ink.alpha[i];
        if a <= 0.0 { continue; }             // no ink: keep the camera pixel
        if a >= 1.0 {                         // solid ink
            fb.pixels[i] = ink.color[i];
            continue;
        }

        let (rf, gf, bf) = unpack_rgb(fb.pixels[i]);
        let (ri, gi, bi) = unpack_rgb(ink.color[i]);

        let inv = 1.0 - a;
        let mix = |under: u8, over: u8| {
            let l = a * lut.srgb_u8_to_linear(over) + inv * lut.srgb_u8_to_linear(under);
            lut.linear_to_srgb_u8(l)
        };
        fb.pixels[i] = pack_rgb(mix(rf, ri), mix(gf, gi), mix(bf, bi));
    }
    Ok(())
}

/// White bones plus red joint dots for all 21 landmarks.
fn draw_skeleton(fb: &mut FrameBuffer, hand: &Hand) {
    let px: Vec<_> = hand
        .landmarks
        .iter()
        .map(|p| p.to_pixels(fb.width, fb.height))
        .collect();

    for &(a, b) in HAND_CONNECTIONS.iter() {
        draw_line(fb, px[a].x as i32, px[a].y as i32, px[b].x as i32, px[b].y as i32, SKELETON_COLOR);
    }
    for p in &px {
        fill_circle(fb, p.x, p.y, JOINT_RADIUS, JOINT_COLOR);
    }
}

/// Pen down: a red dot at the end of the stroke path. Hovering: a ring on each fingertip.
fn draw_cursor(fb: &mut FrameBuffer, overlay: &Overlay) {
    match overlay.pen {
        Some(p) => {
            fill_circle(fb, p.x, p.y, PEN_RADIUS, PEN_COLOR);
            draw_ring(fb, p.x, p.y, PEN_RADIUS, PEN_OUTLINE_WIDTH, PEN_OUTLINE);
        }
        None => {
            let tips = overlay.reading.tips;
            for tip in [tips.index, tips.thumb] {
                draw_ring(fb, tip.x, tip.y, HOVER_RADIUS, HOVER_WIDTH, overlay.color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Tips;

    const GREY: u32 = 0x00_40_40_40;
    const INK: u32 = 0x00_00_FF_00;

    fn live(w: usize, h: usize) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        fb.fill(GREY);
        fb
    }

    fn reading(pinching: bool) -> GestureReading {
        GestureReading::new(
            pinching,
            Tips { index: Point::new(50.0, 50.0), thumb: Point::new(80.0, 50.0) },
        )
    }

    #[test]
    fn test_no_ink_no_hand_shows_camera() {
        let lut = GammaLut::new();
        let mut screen = FrameBuffer::new(64, 48);
        compose(&mut screen, &live(64, 48), &InkLayer::new(64, 48), &lut, None).unwrap();
        assert!(screen.pixels.iter().all(|&p| p == GREY));
    }

    #[test]
    fn test_ink_sits_on_top_of_camera() {
        let lut = GammaLut::new();
        let mut ink = InkLayer::new(64, 48);
        ink.stroke_segment(Point::new(10.0, 10.0), Point::new(40.0, 10.0), 4.0, INK);

        let mut screen = FrameBuffer::new(64, 48);
        compose(&mut screen, &live(64, 48), &ink, &lut, None).unwrap();
        assert_eq!(screen.pixels[9 * 64 + 20], INK);
        assert_eq!(screen.pixels[30 * 64 + 20], GREY);
    }

    #[test]
    fn test_partial_coverage_mixes() {
        let lut = GammaLut::new();
        let mut ink = InkLayer::new(2, 1);
        ink.color[0] = 0x00_FF_FF_FF;
        ink.alpha[0] = 0.5;
        let mut fb = FrameBuffer::new(2, 1);
        blend_ink_in_place(&mut fb, &ink, &lut).unwrap();
        let (r, g, b) = unpack_rgb(fb.pixels[0]);
        assert!(r > 0 && r < 255 && r == g && g == b);
        assert_eq!(fb.pixels[1], 0);
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let lut = GammaLut::new();
        let mut screen = FrameBuffer::new(64, 48);
        let result = compose(&mut screen, &live(32, 24), &InkLayer::new(64, 48), &lut, None);
        assert!(matches!(result, Err(Error::CameraFrame(_))));
    }

    #[test]
    fn test_pinch_cursor_is_filled_at_target() {
        let lut = GammaLut::new();
        let hand = Hand::posed(Point::new(0.5, 0.5), Point::new(0.51, 0.5));
        let r = reading(true);
        let overlay = Overlay { hand: &hand, reading: &r, pen: Some(r.target), color: INK };

        let mut screen = FrameBuffer::new(128, 128);
        compose(&mut screen, &live(128, 128), &InkLayer::new(128, 128), &lut, Some(&overlay)).unwrap();
        // target is the midpoint (65, 50)
        assert_eq!(screen.pixels[50 * 128 + 65], PEN_COLOR);
    }

    #[test]
    fn test_hover_cursor_rings_fingertips() {
        let lut = GammaLut::new();
        let hand = Hand::posed(Point::new(0.9, 0.9), Point::new(0.95, 0.9));
        let r = reading(false);
        let overlay = Overlay { hand: &hand, reading: &r, pen: None, color: INK };

        let mut screen = FrameBuffer::new(128, 128);
        compose(&mut screen, &live(128, 128), &InkLayer::new(128, 128), &lut, Some(&overlay)).unwrap();
        // ring around the index tip at (50,50), hollow center
        assert_eq!(screen.pixels[49 * 128 + 61], INK);
        assert_eq!(screen.pixels[50 * 128 + 50], GREY);
    }

    #[test]
    fn test_overlay_far_outside_the_frame_is_harmless() {
        let lut = GammaLut::new();
        let mut hand = Hand::posed(Point::new(0.5, 0.5), Point::new(0.51, 0.5));
        hand.landmarks[crate::landmarks::INDEX_TIP] = Point::new(1e10, -1e10);
        let r = GestureReading::new(
            true,
            Tips { index: Point::new(f32::MAX, 0.0), thumb: Point::new(64.0, 64.0) },
        );
        let overlay = Overlay { hand: &hand, reading: &r, pen: Some(r.target), color: INK };

        let mut screen = FrameBuffer::new(128, 128);
        compose(&mut screen, &live(128, 128), &InkLayer::new(128, 128), &lut, Some(&overlay)).unwrap();
        // the rest of the skeleton still lands on screen
        assert!(screen.pixels.iter().any(|&p| p == SKELETON_COLOR));
    }
}
