//! Gesture filter: pinch classification with hysteresis plus fingertip smoothing.
//!
//! Two signals are kept apart on purpose. The pinch decision uses the raw,
//! normalized tip distance; the drawing position uses smoothed pixel tips.

use crate::landmarks::Hand;
use crate::types::Point;

/// Raw tip distance below which a pinch starts.
pub const PINCH_START: f32 = 0.05;
/// Raw tip distance above which a pinch may end.
pub const PINCH_STOP: f32 = 0.08;
/// Frames above `PINCH_STOP` tolerated before releasing.
pub const PINCH_BUFFER_FRAMES: u8 = 5;
/// Weight of the current frame in the tip smoothing.
pub const SMOOTHING_ALPHA: f32 = 0.5;

/// Pen-down state carried from frame to frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinchState {
    pub pinching: bool,
    /// Grace frames left before a release is honoured, `0..=PINCH_BUFFER_FRAMES`.
    pub cooldown: u8,
}

impl PinchState {
    /// Feed one frame's raw normalized tip distance. Returns the new pinch state.
    pub fn update(&mut self, distance: f32) -> bool {
        if distance < PINCH_START {
            self.pinching = true;
            self.cooldown = PINCH_BUFFER_FRAMES;
        } else if distance > PINCH_STOP {
            if self.cooldown > 0 {
                self.cooldown -= 1;
                self.pinching = true;
            } else {
                self.pinching = false;
            }
        } else if self.pinching {
            // dead zone: hold on and keep the grace window full
            self.cooldown = PINCH_BUFFER_FRAMES;
        }
        self.pinching
    }
}

/// Index and thumb tip in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tips {
    pub index: Point,
    pub thumb: Point,
}

/// What the gesture filter concluded about one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub pinching: bool,
    /// Smoothed tips; become the next frame's previous position.
    pub tips: Tips,
    /// Where the pen is: tip midpoint while pinching, index tip otherwise.
    pub target: Point,
}

impl GestureReading {
    pub fn new(pinching: bool, tips: Tips) -> Self {
        let target = if pinching { tips.index.midpoint(tips.thumb) } else { tips.index };
        Self { pinching, tips, target }
    }
}

/// Run the gesture filter over one detected hand.
///
/// `previous` is last frame's smoothed tips, if a hand was seen then; without
/// it the raw pixel positions are used as-is.
pub fn read_gesture(
    state: &mut PinchState,
    hand: &Hand,
    previous: Option<Tips>,
    width: usize,
    height: usize,
) -> GestureReading {
    let raw_index = hand.index_tip();
    let raw_thumb = hand.thumb_tip();

    let mut tips = Tips {
        index: raw_index.to_pixels(width, height),
        thumb: raw_thumb.to_pixels(width, height),
    };
    if let Some(prev) = previous {
        tips.index = tips.index.smoothed_from(prev.index, SMOOTHING_ALPHA);
        tips.thumb = tips.thumb.smoothed_from(prev.thumb, SMOOTHING_ALPHA);
    }

    let pinching = state.update(raw_index.distance(raw_thumb));
    GestureReading::new(pinching, tips)
}
