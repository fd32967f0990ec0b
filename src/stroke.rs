//! Stroke recorder: turns per-frame gesture readings into ink segments.

use log::{debug, info, warn};

use crate::config::Style;
use crate::gesture::{GestureReading, Tips};
use crate::ink::InkLayer;
use crate::types::Point;

/// Segments at least this long (pixels) are treated as a tracking jump, not a stroke.
pub const MAX_SEGMENT_PX: f32 = 300.0;
/// Consecutive no-hand frames tolerated before warning (about 1s at 30 fps).
pub const LOST_TRACKING_THRESHOLD: u32 = 30;

/// What the previous hand frame left behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastPoint {
    pub target: Point,
    pub was_pinching: bool,
    pub tips: Tips,
}

/// What happened to the ink this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    /// Not pinching; nothing drawn.
    Hover,
    /// Pinching, but nothing to connect to yet (first pen-down frame).
    PenDown,
    /// Pinching, but the jump from the last point was too long; path restarted here.
    Jumped,
    /// A segment was inked.
    Segment { from: Point, to: Point },
    /// No hand this frame.
    NoHand,
}

#[derive(Debug, Default)]
pub struct StrokeRecorder {
    last: Option<LastPoint>,
    /// Where the current stroke path ends; the compositor draws the pen dot here.
    pen: Option<Point>,
    missed_frames: u32,
    tracking_lost: bool,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one frame in which a hand was found.
    pub fn record(&mut self, ink: &mut InkLayer, reading: &GestureReading, style: &Style) -> StrokeOutcome {
        if self.tracking_lost {
            info!("Hand found again after {} frames", self.missed_frames);
        }
        self.missed_frames = 0;
        self.tracking_lost = false;

        let outcome = if !reading.pinching {
            StrokeOutcome::Hover
        } else {
            match self.last {
                Some(last) if last.was_pinching => {
                    let jump = last.target.distance(reading.target);
                    if jump < MAX_SEGMENT_PX {
                        ink.stroke_segment(last.target, reading.target, style.line_width as f32, style.color);
                        StrokeOutcome::Segment { from: last.target, to: reading.target }
                    } else {
                        debug!("Ignoring {jump:.0}px jump; restarting stroke");
                        StrokeOutcome::Jumped
                    }
                }
                _ => StrokeOutcome::PenDown,
            }
        };

        self.pen = match outcome {
            StrokeOutcome::Hover => None,
            _ => Some(reading.target),
        };

        self.last = Some(LastPoint {
            target: reading.target,
            was_pinching: reading.pinching,
            tips: reading.tips,
        });

        outcome
    }

    /// Handle one frame without a hand.
    pub fn miss(&mut self) -> StrokeOutcome {
        self.last = None;
        self.pen = None;
        self.missed_frames = self.missed_frames.saturating_add(1);
        if self.missed_frames > LOST_TRACKING_THRESHOLD && !self.tracking_lost {
            warn!("No hand detected for {} frames", self.missed_frames);
            self.tracking_lost = true;
        }
        StrokeOutcome::NoHand
    }

    pub fn last_point(&self) -> Option<&LastPoint> {
        self.last.as_ref()
    }

    /// Smoothed tips from the previous hand frame, for the gesture filter.
    pub fn previous_tips(&self) -> Option<Tips> {
        self.last.map(|l| l.tips)
    }

    pub fn pen(&self) -> Option<Point> {
        self.pen
    }

    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    pub fn tracking_lost(&self) -> bool {
        self.tracking_lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_at(x: f32, y: f32, pinching: bool) -> GestureReading {
        let p = Point::new(x, y);
        GestureReading { pinching, tips: Tips { index: p, thumb: p }, target: p }
    }

    fn setup() -> (StrokeRecorder, InkLayer, Style) {
        (StrokeRecorder::new(), InkLayer::new(640, 480), Style::default())
    }

    #[test]
    fn test_first_pinch_frame_only_puts_pen_down() {
        let (mut rec, mut ink, style) = setup();
        assert_eq!(rec.record(&mut ink, &reading_at(100.0, 100.0, true), &style), StrokeOutcome::PenDown);
        assert!(ink.is_blank());
        assert_eq!(rec.pen(), Some(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_consecutive_pinch_frames_draw() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(100.0, 100.0, true), &style);
        let outcome = rec.record(&mut ink, &reading_at(120.0, 100.0, true), &style);
        assert_eq!(
            outcome,
            StrokeOutcome::Segment { from: Point::new(100.0, 100.0), to: Point::new(120.0, 100.0) }
        );
        assert!(ink.coverage_at(110, 99) > 0.0);
    }

    #[test]
    fn test_anti_teleport_resets_then_resumes() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(0.0, 0.0, true), &style);
        assert!(rec.last_point().unwrap().was_pinching);

        let outcome = rec.record(&mut ink, &reading_at(400.0, 0.0, true), &style);
        assert_eq!(outcome, StrokeOutcome::Jumped);
        assert!(ink.is_blank());
        assert_eq!(rec.pen(), Some(Point::new(400.0, 0.0)));

        let outcome = rec.record(&mut ink, &reading_at(410.0, 0.0, true), &style);
        assert!(matches!(outcome, StrokeOutcome::Segment { .. }));
        assert!(!ink.is_blank());
    }

    #[test]
    fn test_exactly_max_jump_does_not_draw() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(0.0, 10.0, true), &style);
        let outcome = rec.record(&mut ink, &reading_at(MAX_SEGMENT_PX, 10.0, true), &style);
        assert_eq!(outcome, StrokeOutcome::Jumped);
    }

    #[test]
    fn test_hover_never_draws() {
        let (mut rec, mut ink, style) = setup();
        for i in 0..50 {
            let x = 100.0 + (i as f32) * 3.0;
            assert_eq!(rec.record(&mut ink, &reading_at(x, 200.0, false), &style), StrokeOutcome::Hover);
        }
        assert!(ink.is_blank());
        assert_eq!(rec.pen(), None);
    }

    #[test]
    fn test_release_then_pinch_starts_new_stroke() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(100.0, 100.0, true), &style);
        rec.record(&mut ink, &reading_at(110.0, 100.0, false), &style);
        assert_eq!(rec.record(&mut ink, &reading_at(120.0, 100.0, true), &style), StrokeOutcome::PenDown);
        assert!(ink.is_blank());
    }

    #[test]
    fn test_last_point_tracks_every_hand_frame() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(5.0, 6.0, false), &style);
        let last = rec.last_point().unwrap();
        assert_eq!(last.target, Point::new(5.0, 6.0));
        assert!(!last.was_pinching);
    }

    #[test]
    fn test_lost_tracking_warning_and_recovery() {
        let (mut rec, mut ink, style) = setup();
        rec.record(&mut ink, &reading_at(100.0, 100.0, true), &style);

        for _ in 0..LOST_TRACKING_THRESHOLD {
            rec.miss();
        }
        assert!(!rec.tracking_lost());
        assert!(rec.last_point().is_none());

        rec.miss();
        assert!(rec.tracking_lost());
        assert_eq!(rec.missed_frames(), LOST_TRACKING_THRESHOLD + 1);

        let outcome = rec.record(&mut ink, &reading_at(101.0, 100.0, true), &style);
        assert_eq!(outcome, StrokeOutcome::PenDown);
        assert!(!rec.tracking_lost());
        assert_eq!(rec.missed_frames(), 0);
        assert!(ink.is_blank());
    }
}
